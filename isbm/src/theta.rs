//! Coupling matrix generators.
//!
//! The sampler only sees an `n x n` matrix; how it is built is a
//! strategy. Any `Fn(usize) -> Result<Array2<f64>>` works as one.

use crate::error::{IsbmError, Result};
use matrix_util::traits::{SymmetricOps, Triangle};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Build a coupling matrix for `n` nodes.
pub trait ThetaGenerator {
    /// `n x n` symmetric coupling matrix
    fn generate(&self, n: usize) -> Result<Array2<f64>>;
}

impl<F> ThetaGenerator for F
where
    F: Fn(usize) -> Result<Array2<f64>>,
{
    fn generate(&self, n: usize) -> Result<Array2<f64>> {
        self(n)
    }
}

fn check_value(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(IsbmError::Configuration(format!(
            "coupling value {} is not finite",
            value
        )))
    }
}

/// Every pair shares the same coupling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformTheta {
    /// coupling strength
    pub value: f64,
}

impl ThetaGenerator for UniformTheta {
    fn generate(&self, n: usize) -> Result<Array2<f64>> {
        Ok(Array2::from_elem((n, n), check_value(self.value)?))
    }
}

/// Strongly coupled clique over the first `size` nodes, zero elsewhere.
///
/// Built by filling the first `size` columns and mirroring the upper
/// triangle, which leaves `value` only where both endpoints are below
/// `size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CliqueTheta {
    /// coupling strength inside the clique
    pub value: f64,
    /// number of clique members
    pub size: usize,
}

impl ThetaGenerator for CliqueTheta {
    fn generate(&self, n: usize) -> Result<Array2<f64>> {
        let value = check_value(self.value)?;
        let size = self.size.min(n);
        let mut theta = Array2::<f64>::zeros((n, n));
        theta.slice_mut(ndarray::s![.., ..size]).fill(value);
        theta.symmetrize_inplace(Triangle::Upper)?;
        Ok(theta)
    }
}

/// Couples each node to its `bandwidth` nearest index neighbours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandedTheta {
    /// coupling strength within the band
    pub value: f64,
    /// number of super-diagonals filled
    pub bandwidth: usize,
}

impl ThetaGenerator for BandedTheta {
    fn generate(&self, n: usize) -> Result<Array2<f64>> {
        let value = check_value(self.value)?;
        let mut theta = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in i..n.min(i + self.bandwidth + 1) {
                theta[(i, j)] = value;
            }
        }
        theta.symmetrize_inplace(Triangle::Upper)?;
        Ok(theta)
    }
}

/// Named generator families, selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThetaKind {
    /// [`UniformTheta`]
    #[default]
    Uniform,
    /// [`CliqueTheta`]
    Clique,
    /// [`BandedTheta`]
    Banded,
}

/// Serializable description of a generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThetaSpec {
    /// generator family
    pub kind: ThetaKind,
    /// coupling strength
    pub value: f64,
    /// clique size (clique only)
    pub size: usize,
    /// band width (banded only)
    pub bandwidth: usize,
}

impl ThetaSpec {
    /// Uniform coupling `value`
    pub fn uniform(value: f64) -> Self {
        ThetaSpec {
            kind: ThetaKind::Uniform,
            value,
            size: 0,
            bandwidth: 0,
        }
    }

    /// Short label, e.g. `clique(5)=10`
    pub fn label(&self) -> String {
        match self.kind {
            ThetaKind::Uniform => format!("uniform={}", self.value),
            ThetaKind::Clique => format!("clique({})={}", self.size, self.value),
            ThetaKind::Banded => format!("banded({})={}", self.bandwidth, self.value),
        }
    }
}

impl ThetaGenerator for ThetaSpec {
    fn generate(&self, n: usize) -> Result<Array2<f64>> {
        match self.kind {
            ThetaKind::Uniform => UniformTheta { value: self.value }.generate(n),
            ThetaKind::Clique => CliqueTheta {
                value: self.value,
                size: self.size,
            }
            .generate(n),
            ThetaKind::Banded => BandedTheta {
                value: self.value,
                bandwidth: self.bandwidth,
            }
            .generate(n),
        }
    }
}
