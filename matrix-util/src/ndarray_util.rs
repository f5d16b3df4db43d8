pub use ndarray::prelude::*;

use crate::traits::*;
use num_traits::Float;

fn check_square<T>(xx: &Array2<T>) -> anyhow::Result<usize> {
    let (nr, nc) = xx.dim();
    if nr != nc {
        return Err(anyhow::anyhow!("not a square matrix: {} x {}", nr, nc));
    }
    Ok(nr)
}

impl<T> SymmetricOps for Array2<T>
where
    T: Clone + PartialEq,
{
    type Mat = Self;
    type Scalar = T;

    fn symmetrize(&self, part: Triangle) -> anyhow::Result<Self::Mat> {
        let mut ret = self.clone();
        ret.symmetrize_inplace(part)?;
        Ok(ret)
    }

    fn symmetrize_inplace(&mut self, part: Triangle) -> anyhow::Result<()> {
        let n = check_square(self)?;
        for i in 0..n {
            for j in (i + 1)..n {
                match part {
                    Triangle::Upper => self[(j, i)] = self[(i, j)].clone(),
                    Triangle::Lower => self[(i, j)] = self[(j, i)].clone(),
                }
            }
        }
        Ok(())
    }

    fn is_symmetric(&self) -> bool {
        let (nr, nc) = self.dim();
        if nr != nc {
            return false;
        }
        (0..nr).all(|i| ((i + 1)..nc).all(|j| self[(i, j)] == self[(j, i)]))
    }

    fn fill_diagonal(&mut self, value: Self::Scalar) {
        self.diag_mut().fill(value);
    }

    fn permute_symmetric(&self, order: &[usize]) -> anyhow::Result<Self::Mat> {
        let n = check_square(self)?;
        if order.len() != n {
            return Err(anyhow::anyhow!(
                "permutation length {} != matrix size {}",
                order.len(),
                n
            ));
        }
        let mut seen = vec![false; n];
        for &k in order {
            if k >= n || seen[k] {
                return Err(anyhow::anyhow!("invalid permutation index {}", k));
            }
            seen[k] = true;
        }
        Ok(Array2::from_shape_fn((n, n), |(i, j)| {
            self[(order[i], order[j])].clone()
        }))
    }
}

impl<T> AsymmetryOps for Array2<T>
where
    T: Float,
{
    type Scalar = T;

    fn max_asymmetry(&self) -> Self::Scalar {
        let (nr, nc) = self.dim();
        let n = nr.min(nc);
        let mut ret = T::zero();
        for i in 0..n {
            for j in (i + 1)..n {
                let d = (self[(i, j)] - self[(j, i)]).abs();
                if d.is_nan() {
                    return d;
                }
                ret = ret.max(d);
            }
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetrize_copies_upper_onto_lower() {
        let xx = array![[8, 1, 2], [0, 8, 4], [0, 0, 8]];
        let yy = xx.symmetrize(Triangle::Upper).unwrap();
        assert_eq!(yy, array![[8, 1, 2], [1, 8, 4], [2, 4, 8]]);
        // input untouched
        assert_eq!(xx[(1, 0)], 0);
    }

    #[test]
    fn symmetrize_copies_lower_onto_upper() {
        let xx = array![[7, 9, 9], [3, 7, 9], [5, 6, 7]];
        let yy = xx.symmetrize(Triangle::Lower).unwrap();
        assert_eq!(yy, array![[7, 3, 5], [3, 7, 6], [5, 6, 7]]);
    }

    #[test]
    fn non_square_is_rejected() {
        let xx = Array2::<f64>::zeros((2, 3));
        assert!(xx.symmetrize(Triangle::Upper).is_err());
        assert!(!xx.is_symmetric());
    }

    #[test]
    fn permutation_must_be_complete() {
        let xx = Array2::<u8>::zeros((3, 3));
        assert!(xx.permute_symmetric(&[0, 1]).is_err());
        assert!(xx.permute_symmetric(&[0, 1, 1]).is_err());
        assert!(xx.permute_symmetric(&[2, 0, 1]).is_ok());
    }

    #[test]
    fn asymmetry_of_float_matrix() {
        let xx = array![[0.0, 1.0], [0.75, 0.0]];
        assert_eq!(xx.max_asymmetry(), 0.25);
    }
}
