use crate::error::{IsbmError, Result};
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};

/// Check that `p` lies in `[0, 1]`.
///
/// Values drifting outside the unit interval are rejected rather than
/// clamped so that upstream bugs surface here.
pub fn check_probability(p: f64, context: &'static str) -> Result<f64> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(IsbmError::InvalidProbability { value: p, context })
    }
}

/// Draw `1` with probability `p`, otherwise `0`.
///
/// * `p` - success probability in `[0, 1]`
/// * `rng` - random source; one independent draw per call
pub fn rbern<R: Rng>(p: f64, rng: &mut R) -> Result<u8> {
    let bern = Bernoulli::new(check_probability(p, "bernoulli")?).map_err(|_| {
        IsbmError::InvalidProbability {
            value: p,
            context: "bernoulli",
        }
    })?;
    Ok(bern.sample(rng) as u8)
}
