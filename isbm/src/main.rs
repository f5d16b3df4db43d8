mod model_args;
mod sample_one;
mod sim_grid;

use sample_one::*;
use sim_grid::*;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "isbm")]
#[command(about = "Ising-coupled stochastic block model graph simulation")]
struct Cli {
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample graphs over a grid of coupling strengths, several runs each
    Sim(SimGridArgs),
    /// Sample one graph and print z, q, a with symmetry checks
    Sample(SampleArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match &cli.commands {
        Commands::Sim(args) => {
            sim_grid(args)?;
        }
        Commands::Sample(args) => {
            sample_one(args)?;
        }
    }

    Ok(())
}
