use crate::model_args::ModelArgs;
use anyhow::Result;
use clap::Args;
use log::info;
use serde::Serialize;
use std::io::Write;

use isbm::summary::ConfigSummary;
use isbm::trial::{run_grid, GridOptions, TrialConfig, TrialResult};
use matrix_util::common_io::open_buf_writer;
use matrix_util::traits::IoOps;

#[derive(Args, Debug, Clone)]
pub struct SimGridArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        default_values_t = vec![10.0, 5.0, 1.0, -1.0, -5.0, -10.0],
        help = "Coupling strengths, one configuration each"
    )]
    pub theta_values: Vec<f64>,

    #[arg(long, default_value = "5", help = "Independent runs per configuration")]
    pub runs_per_config: usize,

    #[arg(long, default_value = "42", help = "Random seed")]
    pub seed: u64,

    #[arg(long, default_value = "1", help = "Number of worker threads")]
    pub num_jobs: usize,

    #[arg(
        short,
        long,
        help = "Output directory for adjacency/label TSV files and grid.json"
    )]
    pub out: Option<String>,

    #[arg(
        long,
        default_value_t = false,
        help = "Keep the original node order instead of grouping nodes by label"
    )]
    pub no_reorder: bool,
}

#[derive(Serialize)]
struct TrialEntry {
    config_index: usize,
    run: usize,
    seed: u64,
    adjacency: Option<String>,
    labels: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct GridManifest<'a> {
    configs: &'a [TrialConfig],
    options: &'a GridOptions,
    reordered: bool,
    summaries: &'a [ConfigSummary],
    trials: Vec<TrialEntry>,
}

pub fn sim_grid(args: &SimGridArgs) -> Result<()> {
    info!("Starting sim");

    let configs: Vec<TrialConfig> = args
        .theta_values
        .iter()
        .map(|&v| args.model.trial_config(v))
        .collect();

    let options = GridOptions {
        runs_per_config: args.runs_per_config,
        seed: args.seed,
        num_jobs: args.num_jobs,
    };

    info!(
        "n={}, p_pos={}, p_neg={}, p_btwn={}, sweeps={}, burn-in={}",
        args.model.nodes,
        args.model.p_pos,
        args.model.p_neg,
        args.model.p_btwn,
        args.model.sweeps,
        args.model.burn_in
    );

    let results = run_grid(&configs, &options)?;

    let summaries: Vec<ConfigSummary> = configs
        .iter()
        .enumerate()
        .map(|(c, config)| ConfigSummary::new(c, config, &results))
        .collect();

    println!(
        "n={} p_pos={} p_neg={} p_btwn={}",
        args.model.nodes, args.model.p_pos, args.model.p_neg, args.model.p_btwn
    );
    for s in summaries.iter() {
        println!("{}", s);
    }

    if let Some(out_dir) = &args.out {
        write_grid(out_dir, args, &configs, &options, &summaries, &results)?;
    }

    info!("sim completed");
    Ok(())
}

fn write_grid(
    out_dir: &str,
    args: &SimGridArgs,
    configs: &[TrialConfig],
    options: &GridOptions,
    summaries: &[ConfigSummary],
    results: &[TrialResult],
) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;

    let reordered = !args.no_reorder;
    let mut trials = Vec::with_capacity(results.len());

    for r in results {
        let stem = format!("{}/cfg{}_run{}", out_dir, r.config_index, r.run);
        let mut entry = TrialEntry {
            config_index: r.config_index,
            run: r.run,
            seed: r.seed,
            adjacency: None,
            labels: None,
            error: None,
        };

        match &r.output {
            Ok(out) => {
                let adj_file = format!("{}.adj.tsv.gz", stem);
                let z_file = format!("{}.z.tsv", stem);
                if reordered {
                    out.reordered_adjacency()?.to_tsv(&adj_file)?;
                } else {
                    out.a.to_tsv(&adj_file)?;
                }
                out.labels().to_tsv(&z_file)?;
                entry.adjacency = Some(adj_file);
                entry.labels = Some(z_file);
            }
            Err(e) => {
                entry.error = Some(e.to_string());
            }
        }
        trials.push(entry);
    }

    let manifest = GridManifest {
        configs,
        options,
        reordered,
        summaries,
        trials,
    };

    let json_file = format!("{}/grid.json", out_dir);
    let mut buf = open_buf_writer(&json_file)?;
    serde_json::to_writer_pretty(&mut buf, &manifest)?;
    writeln!(buf)?;
    buf.flush()?;

    info!("Wrote {} trials and {}", results.len(), json_file);
    Ok(())
}
