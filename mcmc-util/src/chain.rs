use crate::traits::ChainParam;
use rand::Rng;

/// Collected MCMC samples with their log-densities.
///
/// `samples[k]` was recorded at iteration `iterations[k]` of the chain,
/// so a chain that dropped its warmup still knows where it came from.
#[derive(Debug, Clone)]
pub struct McmcChain<P: ChainParam> {
    pub samples: Vec<P>,
    pub log_densities: Vec<f64>,
    pub iterations: Vec<usize>,
}

impl<P: ChainParam> Default for McmcChain<P> {
    fn default() -> Self {
        Self {
            samples: vec![],
            log_densities: vec![],
            iterations: vec![],
        }
    }
}

impl<P: ChainParam> McmcChain<P> {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            samples: Vec::with_capacity(n),
            log_densities: Vec::with_capacity(n),
            iterations: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, iteration: usize, sample: P, log_density: f64) {
        self.samples.push(sample);
        self.log_densities.push(log_density);
        self.iterations.push(iteration);
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Pick one retained sample uniformly at random.
    /// Returns its position in the chain, or `None` if nothing was kept.
    pub fn draw_uniform(&self, rng: &mut impl Rng) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        Some(rng.random_range(0..self.n_samples()))
    }

    /// Element-wise posterior mean across samples.
    pub fn posterior_mean(&self) -> Vec<f64> {
        let n = self.n_samples();
        if n == 0 {
            return vec![];
        }
        let d = self.samples[0].dim();
        let mut mean = vec![0.0f64; d];
        for sample in &self.samples {
            for (i, m) in mean.iter_mut().enumerate() {
                *m += sample.coord(i);
            }
        }
        let inv_n = 1.0 / n as f64;
        for m in &mut mean {
            *m *= inv_n;
        }
        mean
    }

    /// Element-wise posterior variance across samples.
    pub fn posterior_variance(&self) -> Vec<f64> {
        let n = self.n_samples();
        if n < 2 {
            return vec![];
        }
        let mean = self.posterior_mean();
        let mut var = vec![0.0f64; mean.len()];
        for sample in &self.samples {
            for (i, v) in var.iter_mut().enumerate() {
                let diff = sample.coord(i) - mean[i];
                *v += diff * diff;
            }
        }
        let inv = 1.0 / (n - 1) as f64;
        for v in &mut var {
            *v *= inv;
        }
        var
    }

    /// Mean log-density across samples
    pub fn mean_log_density(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.log_densities.iter().sum::<f64>() / self.n_samples() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn spin_chain() -> McmcChain<ndarray::Array1<i8>> {
        let mut chain = McmcChain::with_capacity(4);
        chain.push(10, array![1, 1, -1], -1.0);
        chain.push(11, array![1, -1, -1], 1.0);
        chain.push(12, array![1, 1, -1], -1.0);
        chain.push(13, array![1, -1, -1], 1.0);
        chain
    }

    #[test]
    fn test_posterior_moments() {
        let chain = spin_chain();
        let mean = chain.posterior_mean();
        assert_eq!(mean, vec![1.0, 0.0, -1.0]);

        let var = chain.posterior_variance();
        assert_abs_diff_eq!(var[0], 0.0);
        assert_abs_diff_eq!(var[1], 4.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(var[2], 0.0);

        assert_eq!(chain.mean_log_density(), Some(0.0));
    }

    #[test]
    fn test_draw_uniform_covers_chain() {
        let chain = spin_chain();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut hits = [0usize; 4];
        for _ in 0..4000 {
            let k = chain.draw_uniform(&mut rng).unwrap();
            hits[k] += 1;
        }
        for h in hits {
            assert!(h > 800 && h < 1200, "uneven draws: {:?}", hits);
        }
    }

    #[test]
    fn test_empty_chain() {
        let chain = McmcChain::<ndarray::Array1<i8>>::default();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(chain.draw_uniform(&mut rng).is_none());
        assert!(chain.posterior_mean().is_empty());
        assert!(chain.posterior_variance().is_empty());
        assert!(chain.mean_log_density().is_none());
    }
}
