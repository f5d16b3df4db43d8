/// The strict triangle of a square matrix that is kept as the source
/// of truth when mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triangle {
    Upper,
    Lower,
}

/// Operations on the symmetric structure of square matrices, only
/// implemented for `ndarray::Array2`
pub trait SymmetricOps {
    type Mat;
    type Scalar;

    /// Copy the strict `part` triangle onto the mirrored position.
    /// The diagonal is left untouched and `self` is not modified.
    fn symmetrize(&self, part: Triangle) -> anyhow::Result<Self::Mat>;

    fn symmetrize_inplace(&mut self, part: Triangle) -> anyhow::Result<()>;

    /// `self[i,j] == self[j,i]` for every `i != j` (exact comparison)
    fn is_symmetric(&self) -> bool;

    fn fill_diagonal(&mut self, value: Self::Scalar);

    /// `out[i,j] = self[order[i], order[j]]`
    /// * `order` - a permutation of `0..n`
    fn permute_symmetric(&self, order: &[usize]) -> anyhow::Result<Self::Mat>;
}

/// Largest `|x[i,j] - x[j,i]|` over all pairs
pub trait AsymmetryOps {
    type Scalar;

    fn max_asymmetry(&self) -> Self::Scalar;
}

/// Read and write matrices from and to files
pub trait IoOps {
    type Mat;

    fn from_tsv(tsv_file: &str) -> anyhow::Result<Self::Mat>;

    fn to_tsv(&self, tsv_file: &str) -> anyhow::Result<()>;
}
