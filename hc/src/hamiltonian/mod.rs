//! Hamiltonian operator over the current basis
//!
//! The `Hc` service and the variational driver only rely on [`Hamiltonian`]:
//! a collective `multiply` that maps a vector over the basis to a vector of the
//! same length. [`SparseHamiltonian`] is the distributed implementation built
//! from a configuration space.

mod sparse;

pub use sparse::{owner, SparseHamiltonian};

pub trait Hamiltonian {
    fn n_dets(&self) -> usize;

    /// `H · vector`.
    ///
    /// Collective: every rank must call it with the same vector before any
    /// rank gets its result.
    fn multiply(&self, vector: &[f64]) -> Vec<f64>;
}
