//! Block-visible node order. Pure presentation; never used while sampling.

use crate::error::{IsbmError, Result};
use crate::Labels;
use matrix_util::traits::SymmetricOps;
use ndarray::Array2;

/// Node indices sorted by label (`-1` block first), ties kept in
/// index order.
pub fn label_order(z: &Labels) -> Vec<usize> {
    let mut order: Vec<usize> = (0..z.len()).collect();
    order.sort_by_key(|&i| z[i]);
    order
}

/// Permute rows and columns of `mat` by [`label_order`].
pub fn reorder_by_labels<T>(mat: &Array2<T>, z: &Labels) -> Result<Array2<T>>
where
    T: Clone + PartialEq,
{
    if mat.nrows() != z.len() || mat.ncols() != z.len() {
        return Err(IsbmError::Configuration(format!(
            "matrix {} x {} does not match {} labels",
            mat.nrows(),
            mat.ncols(),
            z.len()
        )));
    }
    Ok(mat.permute_symmetric(&label_order(z))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_stable_order() {
        let z: Labels = array![1, -1, 1, -1, -1];
        assert_eq!(label_order(&z), vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_reorder_makes_blocks_contiguous() {
        let z: Labels = array![1, -1, 1, -1];
        let a: Array2<u8> = Array2::from_shape_fn((4, 4), |(i, j)| {
            (i != j && z[i] == z[j]) as u8
        });
        let b = reorder_by_labels(&a, &z).unwrap();
        let expected: Array2<u8> = array![[0, 1, 0, 0], [1, 0, 0, 0], [0, 0, 0, 1], [0, 0, 1, 0]];
        assert_eq!(b, expected);
    }

    #[test]
    fn test_dimension_mismatch() {
        let z: Labels = array![1, -1];
        let a = Array2::<u8>::zeros((3, 3));
        assert!(reorder_by_labels(&a, &z).is_err());
    }
}
