//! One trial runs theta -> z -> q -> a. A grid runs many trials over
//! several configurations, each with its own seeded generator.

use crate::block::{build_q_matrix, BlockProbs};
use crate::error::{IsbmError, Result};
use crate::ising::{GibbsOptions, IsingDraw, IsingGibbsSampler};
use crate::layout::reorder_by_labels;
use crate::sbm::sample_sbm;
use crate::theta::{ThetaGenerator, ThetaSpec};
use crate::Labels;
use indicatif::{ParallelProgressIterator, ProgressIterator};
use log::{debug, info, warn};
use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Everything needed to run one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    /// number of nodes
    pub n: usize,
    /// block edge probabilities
    pub probs: BlockProbs,
    /// coupling matrix generator
    pub theta: ThetaSpec,
    /// Gibbs sweeps and burn-in
    pub gibbs: GibbsOptions,
}

impl TrialConfig {
    /// Reject the configuration before any sampling
    pub fn validate(&self) -> Result<()> {
        check_num_nodes(self.n)?;
        self.probs.validate()?;
        self.gibbs.validate()
    }
}

/// Intermediate and final matrices of one trial
#[derive(Debug, Clone)]
pub struct TrialOutput {
    /// coupling matrix
    pub theta: Array2<f64>,
    /// Ising draw with chain diagnostics
    pub draw: IsingDraw,
    /// edge probabilities
    pub q: Array2<f64>,
    /// sampled adjacency matrix
    pub a: Array2<u8>,
}

impl TrialOutput {
    /// Block labels of the nodes
    pub fn labels(&self) -> &Labels {
        &self.draw.labels
    }

    /// Adjacency matrix with nodes grouped by label
    pub fn reordered_adjacency(&self) -> Result<Array2<u8>> {
        reorder_by_labels(&self.a, &self.draw.labels)
    }
}

fn check_num_nodes(n: usize) -> Result<()> {
    if n == 0 {
        return Err(IsbmError::Configuration(
            "the number of nodes must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Run theta -> z -> q -> a with any coupling generator.
///
/// * `n` - number of nodes
/// * `generator` - builds the `n x n` coupling matrix
/// * `probs` - block edge probabilities
/// * `gibbs` - sweep and burn-in configuration
/// * `rng` - random source for the whole trial
pub fn sample_graph<G, R>(
    n: usize,
    generator: &G,
    probs: &BlockProbs,
    gibbs: &GibbsOptions,
    rng: &mut R,
) -> Result<TrialOutput>
where
    G: ThetaGenerator + ?Sized,
    R: Rng,
{
    check_num_nodes(n)?;
    probs.validate()?;
    gibbs.validate()?;

    let theta = generator.generate(n)?;
    if theta.dim() != (n, n) {
        return Err(IsbmError::Configuration(format!(
            "generator returned a {} x {} coupling matrix for {} nodes",
            theta.nrows(),
            theta.ncols(),
            n
        )));
    }

    let draw = IsingGibbsSampler::new(&theta, gibbs.clone())?.sample(rng)?;
    let q = build_q_matrix(&draw.labels, probs)?;
    let a = sample_sbm(&q, rng)?;

    debug!(
        "sweep {}: {} nodes labelled +1 out of {}",
        draw.sweep,
        draw.labels.iter().filter(|&&s| s == 1).count(),
        n
    );

    Ok(TrialOutput { theta, draw, q, a })
}

/// Run one trial described by `config`
pub fn run_trial<R: Rng>(config: &TrialConfig, rng: &mut R) -> Result<TrialOutput> {
    config.validate()?;
    sample_graph(config.n, &config.theta, &config.probs, &config.gibbs, rng)
}

/// Options for a grid of trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    /// independent trials per configuration. Default: 5
    pub runs_per_config: usize,
    /// base seed; trial `k` uses `seed + k`. Default: 42
    pub seed: u64,
    /// worker threads; `<= 1` runs sequentially. Default: 1
    pub num_jobs: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptions {
            runs_per_config: 5,
            seed: 42,
            num_jobs: 1,
        }
    }
}

/// Outcome of one trial in a grid
#[derive(Debug)]
pub struct TrialResult {
    /// index into the configuration list
    pub config_index: usize,
    /// run number within the configuration
    pub run: usize,
    /// seed of this trial's generator
    pub seed: u64,
    /// the trial itself; failures stay local
    pub output: Result<TrialOutput>,
}

/// Run `runs_per_config` trials for every configuration.
///
/// Results come back ordered by `(config_index, run)`. Each trial owns
/// a generator seeded with `seed + k`, so the output does not depend on
/// `num_jobs`. A failing trial is logged and kept as an `Err`; it never
/// stops the others.
pub fn run_grid(configs: &[TrialConfig], options: &GridOptions) -> Result<Vec<TrialResult>> {
    let runs = options.runs_per_config;
    let jobs: Vec<(usize, usize)> = (0..configs.len())
        .flat_map(|c| (0..runs).map(move |r| (c, r)))
        .collect();
    let njobs = jobs.len() as u64;

    info!(
        "{} configurations x {} runs = {} trials",
        configs.len(),
        runs,
        njobs
    );

    let run_job = |&(config_index, run): &(usize, usize)| -> TrialResult {
        let k = (config_index * runs + run) as u64;
        let seed = options.seed.wrapping_add(k);
        let mut rng = SmallRng::seed_from_u64(seed);
        let output = run_trial(&configs[config_index], &mut rng);
        if let Err(e) = &output {
            warn!("trial {} of configuration {} failed: {}", run, config_index, e);
        }
        TrialResult {
            config_index,
            run,
            seed,
            output,
        }
    };

    let results: Vec<TrialResult> = if options.num_jobs <= 1 {
        jobs.iter().progress_count(njobs).map(run_job).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.num_jobs)
            .build()
            .map_err(|e| IsbmError::Configuration(e.to_string()))?;
        pool.install(|| {
            jobs.par_iter()
                .progress_count(njobs)
                .map(run_job)
                .collect()
        })
    };

    let nfailed = results.iter().filter(|r| r.output.is_err()).count();
    if nfailed > 0 {
        warn!("{} of {} trials failed", nfailed, njobs);
    }

    Ok(results)
}
