use crate::block::BlockProbs;
use crate::sbm::count_edges;
use crate::trial::{TrialConfig, TrialOutput, TrialResult};
use crate::Labels;
use matrix_util::traits::SymmetricOps;
use ndarray::Array2;
use serde::Serialize;
use std::fmt;

/// Observed edge density inside and between the two blocks
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlockDensity {
    /// edges among `+1` nodes over possible pairs
    pub within_pos: Option<f64>,
    /// edges among `-1` nodes over possible pairs
    pub within_neg: Option<f64>,
    /// edges across blocks over possible pairs
    pub between: Option<f64>,
}

impl BlockDensity {
    /// `None` where a block has no pairs
    pub fn new(a: &Array2<u8>, z: &Labels) -> Self {
        let n = z.len();
        let mut edges = [0usize; 3];
        let mut pairs = [0usize; 3];
        for i in 0..n {
            for j in (i + 1)..n {
                let k = match (z[i], z[j]) {
                    (1, 1) => 0,
                    (-1, -1) => 1,
                    _ => 2,
                };
                pairs[k] += 1;
                edges[k] += (a[(i, j)] != 0) as usize;
            }
        }
        let ratio = |k: usize| (pairs[k] > 0).then(|| edges[k] as f64 / pairs[k] as f64);
        BlockDensity {
            within_pos: ratio(0),
            within_neg: ratio(1),
            between: ratio(2),
        }
    }
}

/// Compact diagnostics of one trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSummary {
    /// number of nodes
    pub n: usize,
    /// nodes labelled `+1`
    pub num_pos: usize,
    /// nodes labelled `-1`
    pub num_neg: usize,
    /// undirected edges
    pub num_edges: usize,
    /// edges over `n (n - 1) / 2`
    pub density: f64,
    /// per-block densities
    pub blocks: BlockDensity,
    /// `q` passed the symmetry check
    pub q_symmetric: bool,
    /// `a` passed the symmetry check
    pub a_symmetric: bool,
    /// selected Gibbs sweep
    pub sweep: usize,
    /// uniform fallbacks during sampling
    pub degenerate_steps: usize,
}

impl TrialSummary {
    /// Summarize a finished trial
    pub fn new(out: &TrialOutput) -> Self {
        let z = out.labels();
        let n = z.len();
        let num_pos = z.iter().filter(|&&s| s == 1).count();
        let num_edges = count_edges(&out.a);
        let npairs = n * n.saturating_sub(1) / 2;
        TrialSummary {
            n,
            num_pos,
            num_neg: n - num_pos,
            num_edges,
            density: if npairs > 0 {
                num_edges as f64 / npairs as f64
            } else {
                0.0
            },
            blocks: BlockDensity::new(&out.a, z),
            q_symmetric: out.q.is_symmetric(),
            a_symmetric: out.a.is_symmetric(),
            sweep: out.draw.sweep,
            degenerate_steps: out.draw.degenerate_steps,
        }
    }
}

/// Averages over the trials of one configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSummary {
    /// index into the configuration list
    pub config_index: usize,
    /// coupling label, e.g. `uniform=5`
    pub theta: String,
    /// successful trials
    pub num_ok: usize,
    /// failed trials
    pub num_failed: usize,
    /// mean edge density over successful trials
    pub mean_density: Option<f64>,
    /// mean fraction of `+1` labels over successful trials
    pub mean_frac_pos: Option<f64>,
}

impl ConfigSummary {
    /// Collect the trials of configuration `config_index`
    pub fn new(config_index: usize, config: &TrialConfig, results: &[TrialResult]) -> Self {
        let mut num_ok = 0;
        let mut num_failed = 0;
        let mut density = 0.0;
        let mut frac_pos = 0.0;

        for r in results.iter().filter(|r| r.config_index == config_index) {
            match &r.output {
                Ok(out) => {
                    let s = TrialSummary::new(out);
                    num_ok += 1;
                    density += s.density;
                    frac_pos += s.num_pos as f64 / s.n as f64;
                }
                Err(_) => num_failed += 1,
            }
        }

        let mean = |x: f64| (num_ok > 0).then(|| x / num_ok as f64);

        ConfigSummary {
            config_index,
            theta: config.theta.label(),
            num_ok,
            num_failed,
            mean_density: mean(density),
            mean_frac_pos: mean(frac_pos),
        }
    }
}

fn fmt_opt(x: Option<f64>) -> String {
    x.map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for ConfigSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4}  {:<18} ok={:<3} failed={:<3} density={:<8} frac(+1)={}",
            self.config_index,
            self.theta,
            self.num_ok,
            self.num_failed,
            fmt_opt(self.mean_density),
            fmt_opt(self.mean_frac_pos)
        )
    }
}

fn write_matrix<T: fmt::Display>(f: &mut fmt::Formatter<'_>, mat: &Array2<T>) -> fmt::Result {
    for row in mat.rows() {
        let line = row
            .iter()
            .map(|x| format!("{}", x))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(f, "[{}]", line)?;
    }
    Ok(())
}

fn write_vec(f: &mut fmt::Formatter<'_>, v: &[f64]) -> fmt::Result {
    let line = v
        .iter()
        .map(|x| format!("{:.2}", x))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(f, "[{}]", line)
}

/// Full text dump of one trial: parameters, z, q, a and symmetry checks
pub struct TrialReport<'a> {
    /// block probabilities used
    pub probs: &'a BlockProbs,
    /// coupling label
    pub theta: String,
    /// the trial
    pub output: &'a TrialOutput,
}

impl fmt::Display for TrialReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let out = self.output;
        let s = TrialSummary::new(out);

        writeln!(f, "N: {}", s.n)?;
        writeln!(f, "Pr(+1): {}", self.probs.p_pos)?;
        writeln!(f, "Pr(-1): {}", self.probs.p_neg)?;
        writeln!(f, "Pr(between): {}", self.probs.p_btwn)?;
        writeln!(f, "Theta: {}", self.theta)?;
        writeln!(f)?;
        writeln!(f, "Z vector (sweep {}):", s.sweep)?;
        let z = out
            .labels()
            .iter()
            .map(|x| format!("{:>2}", x))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(f, "[{}]", z)?;
        writeln!(f, "q matrix:")?;
        write_matrix(f, &out.q)?;
        writeln!(f, "For q: symmetry {}", s.q_symmetric)?;
        writeln!(f, "a matrix:")?;
        write_matrix(f, &out.a)?;
        writeln!(f, "For a: symmetry {}", s.a_symmetric)?;
        writeln!(
            f,
            "+1 nodes: {}, -1 nodes: {}, edges: {}, density: {:.4}",
            s.num_pos, s.num_neg, s.num_edges, s.density
        )?;
        writeln!(
            f,
            "block density: within(+1)={} within(-1)={} between={}",
            fmt_opt(s.blocks.within_pos),
            fmt_opt(s.blocks.within_neg),
            fmt_opt(s.blocks.between)
        )?;
        writeln!(
            f,
            "log density: {:.4} (mean over retained sweeps {:.4})",
            out.draw.log_density, out.draw.mean_log_density
        )?;
        writeln!(f, "mean spin:")?;
        write_vec(f, &out.draw.magnetization)?;
        if !out.draw.spin_variance.is_empty() {
            writeln!(f, "spin variance:")?;
            write_vec(f, &out.draw.spin_variance)?;
        }
        if s.degenerate_steps > 0 {
            writeln!(f, "degenerate Gibbs updates: {}", s.degenerate_steps)?;
        }
        Ok(())
    }
}
