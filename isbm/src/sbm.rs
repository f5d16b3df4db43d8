use crate::bernoulli::{check_probability, rbern};
use crate::error::{IsbmError, Result};
use matrix_util::traits::{SymmetricOps, Triangle};
use ndarray::Array2;
use rand::Rng;

/// Sample an undirected graph from an edge probability matrix.
///
/// Only the strict upper triangle of `q` is read: each pair `i < j`
/// gets one Bernoulli draw, the triangle is mirrored, and the diagonal
/// is forced to zero. The lower triangle and diagonal of `q` are
/// ignored.
///
/// * `q` - square matrix of probabilities in `[0, 1]`
/// * `rng` - random source
pub fn sample_sbm<R: Rng>(q: &Array2<f64>, rng: &mut R) -> Result<Array2<u8>> {
    let (nr, nc) = q.dim();
    if nr != nc {
        return Err(IsbmError::Configuration(format!(
            "probability matrix is not square: {} x {}",
            nr, nc
        )));
    }

    let n = nr;
    let mut a = Array2::<u8>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            a[(i, j)] = rbern(q[(i, j)], rng)?;
        }
    }

    a.symmetrize_inplace(Triangle::Upper)?;
    a.fill_diagonal(0);
    Ok(a)
}

/// Erdős–Rényi graph: every pair is an edge with probability `p`.
pub fn sample_erdos_renyi<R: Rng>(n: usize, p: f64, rng: &mut R) -> Result<Array2<u8>> {
    if n == 0 {
        return Err(IsbmError::Configuration(
            "the number of nodes must be positive".to_string(),
        ));
    }
    let p = check_probability(p, "edge probability")?;
    let mut q = Array2::from_elem((n, n), p);
    q.fill_diagonal(0.0);
    sample_sbm(&q, rng)
}

/// Number of undirected edges (upper triangle ones)
pub fn count_edges(a: &Array2<u8>) -> usize {
    let n = a.nrows().min(a.ncols());
    (0..n)
        .map(|i| ((i + 1)..n).filter(|&j| a[(i, j)] != 0).count())
        .sum()
}
