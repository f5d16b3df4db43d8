//! Sequential-scan Gibbs sampler for the Ising model.
//!
//! Target distribution over `z ∈ {-1,+1}^n`:
//!
//! ```text
//! π(z) ∝ exp( Σ_{i≠j} θ[i,j] z_i z_j )
//! ```
//!
//! Each sweep visits the nodes in index order and redraws `z_i` from
//! its full conditional given the current values of all other nodes,
//! so nodes updated earlier in the sweep are already visible. Sweeps
//! before `burn_in` are discarded; the remaining ones are kept in an
//! [`McmcChain`] and one of them is returned uniformly at random.

use crate::error::{IsbmError, Result};
use crate::Labels;
use log::warn;
use matrix_util::traits::AsymmetryOps;
use mcmc_util::chain::McmcChain;
use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Relative tolerance on `|θ[i,j] - θ[j,i]|`
const SYMMETRY_TOL: f64 = 1e-12;

/// What to do when a conditional distribution cannot be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Draw the spin uniformly from `{-1,+1}` and count the event
    #[default]
    Uniform,
    /// Abort the run with [`IsbmError::DegenerateNormalization`]
    Error,
}

/// Options for the Gibbs sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GibbsOptions {
    /// Total number of full sweeps. Default: 500
    pub total_sweeps: usize,
    /// Number of leading sweeps to discard. Default: 300
    pub burn_in: usize,
    /// Fallback for non-normalizable conditionals. Default: uniform
    pub degenerate: DegeneratePolicy,
}

impl Default for GibbsOptions {
    fn default() -> Self {
        GibbsOptions {
            total_sweeps: 500,
            burn_in: 300,
            degenerate: DegeneratePolicy::Uniform,
        }
    }
}

impl GibbsOptions {
    /// `burn_in < total_sweeps`, so at least one sweep is retained
    pub fn validate(&self) -> Result<()> {
        if self.burn_in >= self.total_sweeps {
            return Err(IsbmError::Configuration(format!(
                "burn-in ({}) must be smaller than the number of sweeps ({})",
                self.burn_in, self.total_sweeps
            )));
        }
        Ok(())
    }

    /// Number of sweeps kept after burn-in
    pub fn retained(&self) -> usize {
        self.total_sweeps.saturating_sub(self.burn_in)
    }
}

/// One labelling drawn from the retained part of the chain.
#[derive(Debug, Clone)]
pub struct IsingDraw {
    /// Spins of the selected sweep
    pub labels: Labels,
    /// Index of the selected sweep (`burn_in <= sweep < total_sweeps`)
    pub sweep: usize,
    /// `Σ_{i≠j} θ[i,j] z_i z_j` of the selected labels
    pub log_density: f64,
    /// Mean spin of every node over the retained sweeps
    pub magnetization: Vec<f64>,
    /// Sample variance of every node's spin over the retained sweeps;
    /// empty when only one sweep is retained
    pub spin_variance: Vec<f64>,
    /// Mean log-density over the retained sweeps
    pub mean_log_density: f64,
    /// Number of node updates that used the uniform fallback
    pub degenerate_steps: usize,
}

/// Retained sweeps and the number of degenerate updates along the way
pub struct IsingChain {
    /// Post burn-in states; `iterations` holds their sweep indices
    pub chain: McmcChain<Labels>,
    /// Number of node updates that used the uniform fallback
    pub degenerate_steps: usize,
}

/// Gibbs sampler bound to one coupling matrix.
pub struct IsingGibbsSampler<'a> {
    theta: &'a Array2<f64>,
    options: GibbsOptions,
}

impl<'a> IsingGibbsSampler<'a> {
    /// Validate the coupling matrix and options before any sampling.
    ///
    /// * `theta` - non-empty, square, finite and symmetric
    /// * `options` - sweep and burn-in configuration
    pub fn new(theta: &'a Array2<f64>, options: GibbsOptions) -> Result<Self> {
        options.validate()?;
        check_coupling_matrix(theta)?;
        Ok(IsingGibbsSampler { theta, options })
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.theta.nrows()
    }

    /// Run all sweeps and keep the ones after burn-in.
    pub fn run_chain<R: Rng>(&self, rng: &mut R) -> Result<IsingChain> {
        let theta = self.theta;
        let n = self.num_nodes();
        let GibbsOptions {
            total_sweeps,
            burn_in,
            degenerate,
        } = self.options;

        let mut z: Labels = Array1::from_shape_fn(n, |_| random_spin(rng));
        // f64 mirror of z for the local fields
        let mut zf: Array1<f64> = z.mapv(|s| s as f64);

        let mut chain = McmcChain::with_capacity(self.options.retained());
        let mut degenerate_steps = 0;

        for sweep in 0..total_sweeps {
            for i in 0..n {
                let h = local_field(theta, &zf, i);
                let update = update_spin(h, degenerate, rng)
                    .ok_or(IsbmError::DegenerateNormalization { node: i, sweep })?;
                degenerate_steps += update.degenerate as usize;

                z[i] = update.value;
                zf[i] = update.value as f64;
            }

            if sweep >= burn_in {
                chain.push(sweep, z.clone(), ising_log_density(theta, &z));
            }
        }

        if degenerate_steps > 0 {
            warn!(
                "{} Gibbs updates could not be normalized; drew those spins uniformly",
                degenerate_steps
            );
        }

        Ok(IsingChain {
            chain,
            degenerate_steps,
        })
    }

    /// Run the chain and return one retained sweep chosen uniformly.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<IsingDraw> {
        let IsingChain {
            mut chain,
            degenerate_steps,
        } = self.run_chain(rng)?;

        let k = chain.draw_uniform(rng).ok_or_else(|| {
            IsbmError::Configuration("no sweep was retained after burn-in".to_string())
        })?;

        let magnetization = chain.posterior_mean();
        let spin_variance = chain.posterior_variance();
        let mean_log_density = chain.mean_log_density().unwrap_or(f64::NAN);
        let sweep = chain.iterations[k];
        let log_density = chain.log_densities[k];
        let labels = chain.samples.swap_remove(k);

        Ok(IsingDraw {
            labels,
            sweep,
            log_density,
            magnetization,
            spin_variance,
            mean_log_density,
            degenerate_steps,
        })
    }
}

/// Convenience wrapper: validate, run, and draw one labelling.
pub fn sample_ising<R: Rng>(
    theta: &Array2<f64>,
    options: &GibbsOptions,
    rng: &mut R,
) -> Result<IsingDraw> {
    IsingGibbsSampler::new(theta, options.clone())?.sample(rng)
}

/// Unnormalized log-density `Σ_{i≠j} θ[i,j] z_i z_j`
pub fn ising_log_density(theta: &Array2<f64>, z: &Labels) -> f64 {
    let n = z.len();
    let mut ret = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i != j {
                ret += theta[(i, j)] * (z[i] as f64) * (z[j] as f64);
            }
        }
    }
    ret
}

fn check_coupling_matrix(theta: &Array2<f64>) -> Result<()> {
    let (nr, nc) = theta.dim();
    if nr == 0 {
        return Err(IsbmError::Configuration(
            "the number of nodes must be positive".to_string(),
        ));
    }
    if nr != nc {
        return Err(IsbmError::Configuration(format!(
            "coupling matrix is not square: {} x {}",
            nr, nc
        )));
    }
    if theta.iter().any(|x| !x.is_finite()) {
        return Err(IsbmError::Configuration(
            "coupling matrix has non-finite entries".to_string(),
        ));
    }
    let scale = theta.iter().fold(1.0f64, |m, x| m.max(x.abs()));
    let asym = theta.max_asymmetry();
    if asym > SYMMETRY_TOL * scale {
        return Err(IsbmError::Configuration(format!(
            "coupling matrix is not symmetric (max |θ[i,j] - θ[j,i]| = {:e})",
            asym
        )));
    }
    Ok(())
}

fn random_spin<R: Rng>(rng: &mut R) -> i8 {
    if rng.random_bool(0.5) {
        1
    } else {
        -1
    }
}

/// `h_i = Σ_{j≠i} θ[i,j] z_j`
///
/// The log-weights of `z_i = -1` and `z_i = +1` are `-h_i` and `+h_i`.
fn local_field(theta: &Array2<f64>, zf: &Array1<f64>, i: usize) -> f64 {
    theta
        .row(i)
        .iter()
        .zip(zf.iter())
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(_, (&t, &z))| t * z)
        .sum()
}

struct SpinUpdate {
    value: i8,
    degenerate: bool,
}

/// One Gibbs update of a node with local field `h`. `None` means the
/// conditional could not be normalized and the policy asks to stop.
fn update_spin<R: Rng>(h: f64, policy: DegeneratePolicy, rng: &mut R) -> Option<SpinUpdate> {
    match sample_spin_log(-h, h, rng) {
        Some(value) => Some(SpinUpdate {
            value,
            degenerate: false,
        }),
        None => match policy {
            DegeneratePolicy::Uniform => Some(SpinUpdate {
                value: random_spin(rng),
                degenerate: true,
            }),
            DegeneratePolicy::Error => None,
        },
    }
}

/// Sample a spin given the log-weights of `-1` and `+1`.
///
/// Finite log-weights are shifted by their maximum before
/// exponentiation, so one weight is exactly 1. A single infinite
/// log-weight (the local field overflowed) puts all mass on the larger
/// side. Returns `None` for NaN or two equal infinite log-weights.
fn sample_spin_log<R: Rng>(log_neg: f64, log_pos: f64, rng: &mut R) -> Option<i8> {
    if log_neg.is_nan() || log_pos.is_nan() {
        return None;
    }

    if log_neg.is_infinite() || log_pos.is_infinite() {
        return match log_neg.partial_cmp(&log_pos) {
            Some(std::cmp::Ordering::Less) => Some(1),
            Some(std::cmp::Ordering::Greater) => Some(-1),
            _ => None,
        };
    }

    let max = log_neg.max(log_pos);
    let w_neg = (log_neg - max).exp();
    let w_pos = (log_pos - max).exp();
    let total = w_neg + w_pos;

    let u: f64 = rng.random::<f64>() * total;
    if u < w_neg {
        Some(-1)
    } else {
        Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn short_run() -> GibbsOptions {
        GibbsOptions {
            total_sweeps: 100,
            burn_in: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_labels_are_spins() {
        let theta = Array2::from_elem((12, 12), 0.7);
        let mut rng = SmallRng::seed_from_u64(42);
        let draw = sample_ising(&theta, &GibbsOptions::default(), &mut rng).unwrap();
        assert_eq!(draw.labels.len(), 12);
        assert!(draw.labels.iter().all(|&s| s == -1 || s == 1));
        assert!(draw.sweep >= 300 && draw.sweep < 500);
        assert_eq!(draw.degenerate_steps, 0);
    }

    #[test]
    fn test_chain_keeps_post_burn_in_sweeps() {
        let theta = Array2::zeros((5, 5));
        let sampler = IsingGibbsSampler::new(&theta, short_run()).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let out = sampler.run_chain(&mut rng).unwrap();
        assert_eq!(out.chain.n_samples(), 50);
        assert_eq!(out.chain.iterations.first(), Some(&50));
        assert_eq!(out.chain.iterations.last(), Some(&99));
    }

    #[test]
    fn test_same_seed_same_labels() {
        let theta =
            Array2::from_shape_fn((20, 20), |(i, j)| if i / 10 == j / 10 { 1.0 } else { -0.5 });
        let a = sample_ising(&theta, &short_run(), &mut SmallRng::seed_from_u64(9)).unwrap();
        let b = sample_ising(&theta, &short_run(), &mut SmallRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.sweep, b.sweep);
    }

    #[test]
    fn test_zero_coupling_is_uniform() {
        let n = 2000;
        let theta = Array2::zeros((n, n));
        let options = GibbsOptions {
            total_sweeps: 3,
            burn_in: 1,
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(2024);
        let draw = sample_ising(&theta, &options, &mut rng).unwrap();
        let npos = draw.labels.iter().filter(|&&s| s == 1).count();
        let frac = npos as f64 / n as f64;
        assert!((frac - 0.5).abs() < 0.05, "fraction of +1: {}", frac);
    }

    #[test]
    fn test_ferromagnetic_coupling_aligns() {
        let theta = Array2::from_elem((10, 10), 5.0);
        let mut rng = SmallRng::seed_from_u64(3);
        let draw = sample_ising(&theta, &GibbsOptions::default(), &mut rng).unwrap();
        let total: i32 = draw.labels.iter().map(|&s| s as i32).sum();
        assert_eq!(total.abs(), 10, "labels {:?}", draw.labels);
    }

    #[test]
    fn test_antiferromagnetic_coupling_balances() {
        let theta = Array2::from_elem((10, 10), -5.0);
        let mut rng = SmallRng::seed_from_u64(4);
        let draw = sample_ising(&theta, &GibbsOptions::default(), &mut rng).unwrap();
        let total: i32 = draw.labels.iter().map(|&s| s as i32).sum();
        assert_eq!(total, 0, "labels {:?}", draw.labels);
        for m in draw.magnetization.iter() {
            assert!(m.abs() <= 1.0);
        }
    }

    #[test]
    fn test_log_density() {
        let theta = ndarray::array![[9.0, 1.0, 2.0], [1.0, 9.0, -1.0], [2.0, -1.0, 9.0]];
        let z: Labels = ndarray::array![1, -1, 1];
        // 2 * (1*(-1) + 2*(1) + (-1)*(-1))
        assert_abs_diff_eq!(ising_log_density(&theta, &z), 4.0);
    }

    #[test]
    fn test_local_field_ignores_diagonal() {
        let theta = ndarray::array![[100.0, 2.0], [2.0, -100.0]];
        let zf = ndarray::array![1.0, -1.0];
        assert_abs_diff_eq!(local_field(&theta, &zf, 0), -2.0);
        assert_abs_diff_eq!(local_field(&theta, &zf, 1), 2.0);
    }

    #[test]
    fn test_sample_spin_log() {
        let mut rng = SmallRng::seed_from_u64(42);

        let mut counts = [0usize; 2];
        for _ in 0..1000 {
            match sample_spin_log(-50.0, 50.0, &mut rng) {
                Some(1) => counts[1] += 1,
                Some(_) => counts[0] += 1,
                None => panic!("finite weights must normalize"),
            }
        }
        assert_eq!(counts, [0, 1000]);

        // huge but finite log-weights survive the max shift
        assert!(sample_spin_log(-1e300, 1e300, &mut rng).is_some());

        // an overflowed field is decisive, not degenerate
        assert_eq!(sample_spin_log(f64::NEG_INFINITY, f64::INFINITY, &mut rng), Some(1));
        assert_eq!(sample_spin_log(f64::INFINITY, f64::NEG_INFINITY, &mut rng), Some(-1));
        assert_eq!(sample_spin_log(f64::NEG_INFINITY, 0.0, &mut rng), Some(1));

        assert!(sample_spin_log(f64::NAN, 0.0, &mut rng).is_none());
        assert!(sample_spin_log(f64::INFINITY, f64::INFINITY, &mut rng).is_none());
    }

    #[test]
    fn test_overflowed_field_aligns_ferromagnet() {
        // pairwise sums overflow to ±inf whenever two neighbours agree
        let theta = Array2::from_elem((3, 3), 1e308);
        let options = GibbsOptions {
            total_sweeps: 200,
            burn_in: 100,
            ..Default::default()
        };
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let draw = sample_ising(&theta, &options, &mut rng).unwrap();
            assert_eq!(draw.degenerate_steps, 0);
            let total: i32 = draw.labels.iter().map(|&s| s as i32).sum();
            assert_eq!(total.abs(), 3, "seed {}: labels {:?}", seed, draw.labels);
        }
    }

    #[test]
    fn test_degenerate_policy() {
        let mut rng = SmallRng::seed_from_u64(5);

        let mut counts = [0usize; 2];
        for _ in 0..1000 {
            let spin = update_spin(f64::NAN, DegeneratePolicy::Uniform, &mut rng).unwrap();
            assert!(spin.degenerate);
            counts[(spin.value == 1) as usize] += 1;
        }
        assert!(counts[0] > 400 && counts[1] > 400, "counts {:?}", counts);

        assert!(update_spin(f64::NAN, DegeneratePolicy::Error, &mut rng).is_none());

        let spin = update_spin(f64::INFINITY, DegeneratePolicy::Error, &mut rng).unwrap();
        assert_eq!(spin.value, 1);
        assert!(!spin.degenerate);
    }

    #[test]
    fn test_draw_reports_chain_moments() {
        let theta = Array2::from_elem((10, 10), 5.0);
        let mut rng = SmallRng::seed_from_u64(3);
        let draw = sample_ising(&theta, &short_run(), &mut rng).unwrap();

        assert_eq!(draw.spin_variance.len(), 10);
        for (m, v) in draw.magnetization.iter().zip(draw.spin_variance.iter()) {
            // an aligned ferromagnet stays put
            assert_abs_diff_eq!(m.abs(), 1.0);
            assert_abs_diff_eq!(*v, 0.0);
        }
        // 90 ordered pairs of aligned spins
        assert_abs_diff_eq!(draw.mean_log_density, 450.0);
        assert_abs_diff_eq!(draw.log_density, 450.0);
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let mut rng = SmallRng::seed_from_u64(0);

        let theta = Array2::zeros((0, 0));
        assert!(matches!(
            sample_ising(&theta, &GibbsOptions::default(), &mut rng),
            Err(IsbmError::Configuration(_))
        ));

        let theta = Array2::zeros((3, 3));
        let options = GibbsOptions {
            total_sweeps: 10,
            burn_in: 10,
            ..Default::default()
        };
        assert!(matches!(
            sample_ising(&theta, &options, &mut rng),
            Err(IsbmError::Configuration(_))
        ));

        let theta = ndarray::array![[0.0, 1.0], [2.0, 0.0]];
        assert!(IsingGibbsSampler::new(&theta, GibbsOptions::default()).is_err());

        let theta = ndarray::array![[0.0, f64::NAN], [f64::NAN, 0.0]];
        assert!(IsingGibbsSampler::new(&theta, GibbsOptions::default()).is_err());
    }
}
