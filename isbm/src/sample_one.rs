use crate::model_args::ModelArgs;
use anyhow::Result;
use clap::Args;
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use isbm::summary::TrialReport;
use isbm::trial::run_trial;
use matrix_util::traits::IoOps;

#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[arg(
        long,
        default_value = "5",
        allow_hyphen_values = true,
        help = "Coupling strength"
    )]
    pub theta_value: f64,

    #[arg(long, default_value = "42", help = "Random seed")]
    pub seed: u64,

    #[arg(
        short,
        long,
        help = "Output prefix; writes {out}.theta.tsv.gz, {out}.z.tsv, {out}.q.tsv.gz, {out}.adj.tsv.gz"
    )]
    pub out: Option<String>,

    #[arg(
        long,
        default_value_t = false,
        help = "Keep the original node order instead of grouping nodes by label"
    )]
    pub no_reorder: bool,
}

pub fn sample_one(args: &SampleArgs) -> Result<()> {
    let config = args.model.trial_config(args.theta_value);
    info!("Sampling one graph: {}", config.theta.label());

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let out = run_trial(&config, &mut rng)?;

    let report = TrialReport {
        probs: &config.probs,
        theta: config.theta.label(),
        output: &out,
    };
    print!("{}", report);

    if let Some(prefix) = &args.out {
        matrix_util::common_io::mkdir(prefix)?;
        let adj = if args.no_reorder {
            out.a.clone()
        } else {
            out.reordered_adjacency()?
        };
        out.theta.to_tsv(&format!("{}.theta.tsv.gz", prefix))?;
        out.labels().to_tsv(&format!("{}.z.tsv", prefix))?;
        out.q.to_tsv(&format!("{}.q.tsv.gz", prefix))?;
        adj.to_tsv(&format!("{}.adj.tsv.gz", prefix))?;
        info!("Wrote matrices with prefix {}", prefix);
    }

    Ok(())
}
