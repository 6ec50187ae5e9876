use super::Hamiltonian;
use crate::coordinator::Coordinator;
use det::{Det, System};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

/// Rank that owns row `det`.
pub fn owner(det: usize, n_ranks: usize) -> usize {
    det % n_ranks
}

struct SparseRow {
    index: usize,
    cols: Vec<usize>,
    elems: Vec<f64>,
}

/// Row-distributed sparse Hamiltonian.
///
/// Each rank keeps the rows it owns (round-robin over determinant indices),
/// restricted to connections inside the basis. `multiply` computes the owned
/// rows and sums the partial vectors over the group, so every rank ends up
/// with the full product. Columns within a row are sorted, which makes the
/// result independent of the number of ranks.
pub struct SparseHamiltonian<'a, S: System, C: Coordinator> {
    system: &'a S,
    coordinator: &'a C,
    rows: Vec<SparseRow>,
    n_dets: usize,
}

impl<'a, S, C> SparseHamiltonian<'a, S, C>
where
    S: System + Sync,
    C: Coordinator,
{
    pub fn new(system: &'a S, coordinator: &'a C) -> Self {
        let mut hamiltonian = SparseHamiltonian {
            system,
            coordinator,
            rows: Vec::new(),
            n_dets: 0,
        };
        hamiltonian.update();
        hamiltonian
    }

    /// Rebuild the local rows from the space's current basis.
    pub fn update(&mut self) {
        let system = self.system;
        let dets = system.data().dets();
        let index: HashMap<&Det, usize> =
            dets.iter().enumerate().map(|(i, d)| (d, i)).collect();

        let rank = self.coordinator.rank();
        let size = self.coordinator.size();
        let owned: Vec<usize> = (0..dets.len()).filter(|&i| owner(i, size) == rank).collect();

        self.rows = owned
            .par_iter()
            .map(|&i| build_row(system, dets, &index, i))
            .collect();
        self.n_dets = dets.len();

        debug!(
            "Rank {} holds {} rows with {} elements",
            rank,
            self.rows.len(),
            self.n_elems()
        );
        if self.coordinator.is_leader() {
            info!("Hamiltonian built over {} determinants", self.n_dets);
        }
    }

    /// Number of stored elements on this rank.
    pub fn n_elems(&self) -> usize {
        self.rows.iter().map(|row| row.cols.len()).sum()
    }
}

fn build_row<S: System>(
    system: &S,
    dets: &[Det],
    index: &HashMap<&Det, usize>,
    i: usize,
) -> SparseRow {
    let det = &dets[i];
    let mut entries: Vec<(usize, f64)> = Vec::new();
    system.find_connected_dets(det, f64::INFINITY, 0.0, &mut |connected, n_excite| {
        if let Some(&j) = index.get(connected) {
            let elem = system.get_hamiltonian_elem(det, connected, n_excite);
            if elem != 0.0 {
                entries.push((j, elem));
            }
        }
    });
    entries.sort_unstable_by_key(|&(j, _)| j);
    entries.dedup_by_key(|entry| entry.0);

    let (cols, elems) = entries.into_iter().unzip();
    SparseRow { index: i, cols, elems }
}

impl<'a, S, C> Hamiltonian for SparseHamiltonian<'a, S, C>
where
    S: System + Sync,
    C: Coordinator,
{
    fn n_dets(&self) -> usize {
        self.n_dets
    }

    fn multiply(&self, vector: &[f64]) -> Vec<f64> {
        assert_eq!(
            vector.len(),
            self.n_dets,
            "vector length does not match the basis size"
        );
        let partial: Vec<(usize, f64)> = self
            .rows
            .par_iter()
            .map(|row| {
                let value = row
                    .cols
                    .iter()
                    .zip(row.elems.iter())
                    .fold(0.0, |acc, (&j, &h)| acc + h * vector[j]);
                (row.index, value)
            })
            .collect();

        let mut result = vec![0.0; self.n_dets];
        for (i, value) in partial {
            result[i] = value;
        }
        self.coordinator.all_reduce_sum(&mut result);
        result
    }
}
