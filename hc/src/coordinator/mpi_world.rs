use super::Coordinator;
use color_eyre::eyre::{eyre, Result};
use mpi::collective::SystemOperation;
use mpi::environment::Universe;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

/// Coordinator over `MPI_COMM_WORLD`.
pub struct MpiCoordinator {
    // Finalises MPI when dropped.
    _universe: Universe,
    world: SimpleCommunicator,
}

impl MpiCoordinator {
    pub fn init() -> Result<Self> {
        let universe =
            mpi::initialize().ok_or_else(|| eyre!("MPI has already been initialised"))?;
        let world = universe.world();
        Ok(MpiCoordinator {
            _universe: universe,
            world,
        })
    }
}

impl Coordinator for MpiCoordinator {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn barrier(&self) {
        self.world.barrier();
    }

    fn broadcast_bytes(&self, bytes: &mut Vec<u8>) {
        let root = self.world.process_at_rank(0);
        let mut len = bytes.len() as u64;
        root.broadcast_into(&mut len);
        if !self.is_leader() {
            bytes.resize(len as usize, 0u8);
        }
        if len > 0 {
            root.broadcast_into(&mut bytes[..]);
        }
    }

    fn broadcast_f64s(&self, values: &mut [f64]) {
        if values.is_empty() {
            return;
        }
        let root = self.world.process_at_rank(0);
        root.broadcast_into(values);
    }

    fn all_reduce_sum(&self, values: &mut [f64]) {
        if values.is_empty() {
            return;
        }
        let send = values.to_vec();
        self.world
            .all_reduce_into(&send[..], values, SystemOperation::sum());
    }
}
