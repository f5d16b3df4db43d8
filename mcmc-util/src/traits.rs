use ndarray::Array1;

/// A retained MCMC state that can be summarized coordinate-wise.
pub trait ChainParam: Clone {
    fn dim(&self) -> usize;

    /// Coordinate `i` as `f64`
    fn coord(&self, i: usize) -> f64;
}

impl ChainParam for Array1<i8> {
    fn dim(&self) -> usize {
        self.len()
    }

    fn coord(&self, i: usize) -> f64 {
        self[i] as f64
    }
}
