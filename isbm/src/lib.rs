//! Ising-coupled stochastic block model (SBM) graph simulation.
//!
//! A latent spin `z_i ∈ {-1,+1}` is drawn for every node from an Ising
//! model with coupling matrix `theta` by sequential-scan Gibbs sampling.
//! The spins split the nodes into two blocks, which fix the edge
//! probability of every pair:
//!
//! ```text
//! q[i,j] = p_pos   if z_i = z_j = +1
//!          p_neg   if z_i = z_j = -1
//!          p_btwn  if z_i ≠ z_j
//! a[i,j] ~ Bernoulli(q[i,j]),  i < j
//! ```
//!
//! All randomness flows through an explicitly passed `rand::Rng`.

#![warn(missing_docs)]

/// Single Bernoulli draws
pub mod bernoulli;

/// Label vector to block probability matrix
pub mod block;

/// Typed errors of the sampling pipeline
pub mod error;

/// Sequential-scan Gibbs sampler for the Ising model
pub mod ising;

/// Presentation order of nodes by label
pub mod layout;

/// Bernoulli graph samplers over probability matrices
pub mod sbm;

/// Human-readable trial diagnostics
pub mod summary;

/// Pluggable coupling matrix generators
pub mod theta;

/// Trial pipeline and multi-configuration grid
pub mod trial;

pub use error::{IsbmError, Result};

/// One spin per node, each exactly `-1` or `+1`
pub type Labels = ndarray::Array1<i8>;
