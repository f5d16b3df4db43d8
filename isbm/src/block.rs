use crate::bernoulli::check_probability;
use crate::error::{IsbmError, Result};
use crate::Labels;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Edge probabilities of the two-block model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockProbs {
    /// both endpoints labelled `+1`
    pub p_pos: f64,
    /// both endpoints labelled `-1`
    pub p_neg: f64,
    /// endpoints in different blocks
    pub p_btwn: f64,
}

impl BlockProbs {
    /// Validated constructor
    pub fn new(p_pos: f64, p_neg: f64, p_btwn: f64) -> Result<Self> {
        let ret = BlockProbs {
            p_pos,
            p_neg,
            p_btwn,
        };
        ret.validate()?;
        Ok(ret)
    }

    /// Every probability must lie in `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        check_probability(self.p_pos, "p_pos")?;
        check_probability(self.p_neg, "p_neg")?;
        check_probability(self.p_btwn, "p_btwn")?;
        Ok(())
    }

    /// Edge probability between two (already validated) labels
    pub fn pair(&self, zi: i8, zj: i8) -> f64 {
        match (zi, zj) {
            (1, 1) => self.p_pos,
            (-1, -1) => self.p_neg,
            _ => self.p_btwn,
        }
    }
}

/// Every entry must be exactly `-1` or `+1`.
pub fn check_labels(z: &Labels) -> Result<()> {
    match z.iter().position(|&s| s != 1 && s != -1) {
        Some(index) => Err(IsbmError::InvalidLabel {
            index,
            value: z[index],
        }),
        None => Ok(()),
    }
}

/// Build the `n x n` edge probability matrix from block labels.
///
/// ```text
/// q[i,i] = 0
/// q[i,j] = p_pos if z_i = z_j = +1; p_neg if z_i = z_j = -1; p_btwn otherwise
/// ```
///
/// The result is symmetric because the rule depends only on the
/// unordered pair of labels.
pub fn build_q_matrix(z: &Labels, probs: &BlockProbs) -> Result<Array2<f64>> {
    probs.validate()?;
    check_labels(z)?;

    let n = z.len();
    Ok(Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            0.0
        } else {
            probs.pair(z[i], z[j])
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_util::traits::SymmetricOps;
    use ndarray::array;

    #[test]
    fn test_block_rule() {
        let z: Labels = array![1, -1, 1, -1, -1];
        let probs = BlockProbs::new(0.9, 0.7, 0.01).unwrap();
        let q = build_q_matrix(&z, &probs).unwrap();

        assert!(q.is_symmetric());
        for i in 0..5 {
            assert_eq!(q[(i, i)], 0.0);
            for j in 0..5 {
                if i == j {
                    continue;
                }
                let expected = match (z[i], z[j]) {
                    (1, 1) => 0.9,
                    (-1, -1) => 0.7,
                    _ => 0.01,
                };
                assert_eq!(q[(i, j)], expected);
            }
        }
    }

    #[test]
    fn test_zero_probabilities_give_zero_matrix() {
        for z in [array![1i8, 1, 1], array![-1i8, 1, -1]] {
            let q = build_q_matrix(&z, &BlockProbs::new(0.0, 0.0, 0.0).unwrap()).unwrap();
            assert!(q.iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn test_invalid_label() {
        let z: Labels = array![1, 0, -1];
        let probs = BlockProbs::new(0.5, 0.5, 0.5).unwrap();
        assert_eq!(
            build_q_matrix(&z, &probs),
            Err(IsbmError::InvalidLabel { index: 1, value: 0 })
        );
    }

    #[test]
    fn test_invalid_probability() {
        assert!(matches!(
            BlockProbs::new(1.5, 0.5, 0.5),
            Err(IsbmError::InvalidProbability {
                context: "p_pos",
                ..
            })
        ));
        let probs = BlockProbs {
            p_pos: 0.5,
            p_neg: 0.5,
            p_btwn: -0.1,
        };
        let z: Labels = array![1, -1];
        assert!(matches!(
            build_q_matrix(&z, &probs),
            Err(IsbmError::InvalidProbability {
                context: "p_btwn",
                ..
            })
        ));
    }
}
