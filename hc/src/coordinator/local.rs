use super::Coordinator;
use std::sync::{Arc, Barrier, Mutex, MutexGuard, PoisonError};
use std::thread;

struct Shared {
    size: usize,
    barrier: Barrier,
    bytes: Mutex<Vec<u8>>,
    values: Mutex<Vec<f64>>,
    // One contribution per rank for reductions.
    slots: Vec<Mutex<Vec<f64>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One rank of a [`LocalGroup`].
pub struct LocalCoordinator {
    rank: usize,
    shared: Arc<Shared>,
}

/// Ranks emulated by threads of the current process.
///
/// Staging buffers live behind the group barrier: the leader writes, everyone
/// waits, the others read, everyone waits again before the buffer is reused.
pub struct LocalGroup;

impl LocalGroup {
    pub fn new(size: usize) -> Vec<LocalCoordinator> {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            size,
            barrier: Barrier::new(size),
            bytes: Mutex::new(Vec::new()),
            values: Mutex::new(Vec::new()),
            slots: (0..size).map(|_| Mutex::new(Vec::new())).collect(),
        });
        (0..size)
            .map(|rank| LocalCoordinator {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    /// Run `f` once per rank, each on its own thread, and collect the results
    /// in rank order.
    pub fn run<F, T>(size: usize, f: F) -> Vec<T>
    where
        F: Fn(LocalCoordinator) -> T + Sync,
        T: Send,
    {
        let coordinators = LocalGroup::new(size);
        let f = &f;
        thread::scope(|scope| {
            let handles: Vec<_> = coordinators
                .into_iter()
                .map(|coordinator| scope.spawn(move || f(coordinator)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|e| std::panic::resume_unwind(e))
                })
                .collect()
        })
    }
}

impl Coordinator for LocalCoordinator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn barrier(&self) {
        self.shared.barrier.wait();
    }

    fn broadcast_bytes(&self, bytes: &mut Vec<u8>) {
        if self.is_leader() {
            let mut stage = lock(&self.shared.bytes);
            stage.clear();
            stage.extend_from_slice(bytes);
        }
        self.barrier();
        if !self.is_leader() {
            let stage = lock(&self.shared.bytes);
            bytes.clear();
            bytes.extend_from_slice(&stage);
        }
        self.barrier();
    }

    fn broadcast_f64s(&self, values: &mut [f64]) {
        if self.is_leader() {
            let mut stage = lock(&self.shared.values);
            stage.clear();
            stage.extend_from_slice(values);
        }
        self.barrier();
        if !self.is_leader() {
            let stage = lock(&self.shared.values);
            assert_eq!(
                stage.len(),
                values.len(),
                "broadcast length differs between ranks"
            );
            values.copy_from_slice(&stage);
        }
        self.barrier();
    }

    fn all_reduce_sum(&self, values: &mut [f64]) {
        {
            let mut slot = lock(&self.shared.slots[self.rank]);
            slot.clear();
            slot.extend_from_slice(values);
        }
        self.barrier();
        values.iter_mut().for_each(|v| *v = 0.0);
        // Fixed rank order keeps the result bit-identical on every rank.
        for slot in &self.shared.slots {
            let slot = lock(slot);
            for (v, x) in values.iter_mut().zip(slot.iter()) {
                *v += x;
            }
        }
        self.barrier();
    }
}
