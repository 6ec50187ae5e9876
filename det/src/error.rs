use crate::det::{Det, HalfDet};
use thiserror::Error;

/// Failures raised by configuration spaces and their persisted state.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("no cached diagonal contribution for half determinant {0}")]
    NotFound(HalfDet),

    #[error("determinant {det} does not carry {n_up} up and {n_dn} down electrons")]
    ParticleCount { det: Det, n_up: u32, n_dn: u32 },

    #[error("determinant {0} is already in the basis")]
    DuplicateDet(Det),

    #[error("coefficient vector has length {got}, basis has {expected} determinants")]
    CoefLength { expected: usize, got: usize },

    #[error("invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("failed to (de)serialize system state: {0}")]
    Persist(#[from] bincode::Error),
}
