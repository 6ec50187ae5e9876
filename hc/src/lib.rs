//! Distributed Hamiltonian-action service for lattice models
//!
//! A group of ranks holds the same basis of determinants. The leader serves
//! one TCP client that can fetch the coefficient vector and ask for `H · v`;
//! every rank takes part in each multiplication.

pub mod app;
pub mod config;
pub mod coordinator;
pub mod hamiltonian;
pub mod io;
pub mod server;
pub mod variation;

#[cfg(test)]
mod testing;

pub use coordinator::{Coordinator, LocalGroup, SingleProcess};
pub use hamiltonian::{Hamiltonian, SparseHamiltonian};
pub use server::{HcClient, HcServer, ServerOptions, ServerState};
pub use variation::{Variation, VariationOptions};
