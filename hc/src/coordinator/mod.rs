//! Process-group coordination
//!
//! Every rank runs the same program; rank 0 is the leader. The `Coordinator`
//! trait exposes the handful of collectives the `Hc` service and the
//! Hamiltonian operator need:
//!
//! - `barrier`
//! - leader-to-all broadcasts of bytes and of `f64` slices
//! - an element-wise sum reduction whose result lands on every rank
//!
//! Back ends: [`SingleProcess`] (all collectives are no-ops), [`LocalGroup`]
//! (ranks are threads of one process) and, with the `mpi` feature,
//! `MpiCoordinator`.

mod local;
#[cfg(feature = "mpi")]
mod mpi_world;
mod single;
mod tests;

pub use local::{LocalCoordinator, LocalGroup};
#[cfg(feature = "mpi")]
pub use mpi_world::MpiCoordinator;
pub use single::SingleProcess;

use color_eyre::eyre::{Result, WrapErr};
use serde::{de::DeserializeOwned, Serialize};

/// Number of doubles moved per broadcast when shipping large vectors.
pub const CHUNK_SIZE: usize = 1 << 20;

pub trait Coordinator {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn is_leader(&self) -> bool {
        self.rank() == 0
    }

    fn barrier(&self);

    /// Replace `bytes` on every rank with the leader's copy. Lengths may differ
    /// before the call.
    fn broadcast_bytes(&self, bytes: &mut Vec<u8>);

    /// Overwrite `values` on every rank with the leader's slice of the same length.
    fn broadcast_f64s(&self, values: &mut [f64]);

    /// Element-wise sum over ranks, result on every rank.
    fn all_reduce_sum(&self, values: &mut [f64]);
}

/// Broadcast any serialisable value from the leader to all ranks.
pub fn broadcast_value<C, T>(coordinator: &C, value: &mut T) -> Result<()>
where
    C: Coordinator + ?Sized,
    T: Serialize + DeserializeOwned,
{
    let mut bytes = if coordinator.is_leader() {
        bincode::serialize(value).wrap_err("Failed to encode broadcast value")?
    } else {
        Vec::new()
    };
    coordinator.broadcast_bytes(&mut bytes);
    if !coordinator.is_leader() {
        *value = bincode::deserialize(&bytes).wrap_err("Failed to decode broadcast value")?;
    }
    Ok(())
}

/// Collective: true on every rank iff `ok` holds on every rank.
pub fn all_succeeded<C>(coordinator: &C, ok: bool) -> bool
where
    C: Coordinator + ?Sized,
{
    let mut failures = [if ok { 0.0 } else { 1.0 }];
    coordinator.all_reduce_sum(&mut failures);
    failures[0] == 0.0
}

/// Broadcast `values` from the leader in pieces of at most `chunk` doubles.
pub fn broadcast_chunked<C>(coordinator: &C, values: &mut [f64], chunk: usize)
where
    C: Coordinator + ?Sized,
{
    let chunk = chunk.max(1);
    for piece in values.chunks_mut(chunk) {
        coordinator.broadcast_f64s(piece);
    }
}
