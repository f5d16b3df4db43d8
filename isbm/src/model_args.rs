use clap::Args;
use isbm::block::BlockProbs;
use isbm::ising::{DegeneratePolicy, GibbsOptions};
use isbm::theta::{ThetaKind, ThetaSpec};
use isbm::trial::TrialConfig;

/// Model parameters shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    #[arg(short, long, default_value = "50", help = "Number of nodes")]
    pub nodes: usize,

    #[arg(
        long,
        default_value = "0.9",
        help = "Edge probability within the +1 block"
    )]
    pub p_pos: f64,

    #[arg(
        long,
        default_value = "0.7",
        help = "Edge probability within the -1 block"
    )]
    pub p_neg: f64,

    #[arg(long, default_value = "0.01", help = "Edge probability between blocks")]
    pub p_btwn: f64,

    #[arg(
        long,
        value_enum,
        default_value = "clique",
        help = "Coupling matrix generator"
    )]
    pub theta_kind: ThetaKind,

    #[arg(
        long,
        default_value = "5",
        help = "Number of strongly coupled nodes (clique generator)"
    )]
    pub clique_size: usize,

    #[arg(
        long,
        default_value = "3",
        help = "Number of coupled neighbours on each side (banded generator)"
    )]
    pub bandwidth: usize,

    #[arg(long, default_value = "500", help = "Total number of Gibbs sweeps")]
    pub sweeps: usize,

    #[arg(
        long,
        default_value = "300",
        help = "Number of leading Gibbs sweeps to discard"
    )]
    pub burn_in: usize,

    #[arg(
        long,
        default_value_t = false,
        help = "Fail when a Gibbs conditional cannot be normalized instead of drawing uniformly"
    )]
    pub strict: bool,
}

impl ModelArgs {
    pub fn theta_spec(&self, value: f64) -> ThetaSpec {
        ThetaSpec {
            kind: self.theta_kind,
            value,
            size: self.clique_size,
            bandwidth: self.bandwidth,
        }
    }

    pub fn trial_config(&self, theta_value: f64) -> TrialConfig {
        TrialConfig {
            n: self.nodes,
            probs: BlockProbs {
                p_pos: self.p_pos,
                p_neg: self.p_neg,
                p_btwn: self.p_btwn,
            },
            theta: self.theta_spec(theta_value),
            gibbs: GibbsOptions {
                total_sweeps: self.sweeps,
                burn_in: self.burn_in,
                degenerate: if self.strict {
                    DegeneratePolicy::Error
                } else {
                    DegeneratePolicy::Uniform
                },
            },
        }
    }
}
