//! Extended Hubbard model on a chain or a rectangular lattice
//!
//! H = -t Σ_<ij>σ (c†_iσ c_jσ + h.c.) + U Σ_i n_i↑ n_i↓ + V Σ_<ij> n_i n_j + Σ_iσ ε_i n_iσ
//!
//! Sites double as spatial orbitals. The same-spin part of the diagonal
//! (on-site energies and same-spin V) only depends on one `HalfDet`, which is
//! what the diagonal cache stores.

use crate::det::{Det, HalfDet};
use crate::error::SystemError;
use crate::system::{System, SystemData};
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Lattice geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Lattice {
    #[serde(rename = "chain")]
    Chain { n_sites: u32, periodic: bool },
    #[serde(rename = "square")]
    Square { nx: u32, ny: u32, periodic: bool },
}

impl Lattice {
    pub fn n_sites(&self) -> u32 {
        match *self {
            Lattice::Chain { n_sites, .. } => n_sites,
            Lattice::Square { nx, ny, .. } => nx * ny,
        }
    }

    /// Nearest-neighbour bonds as `(lo, hi)` pairs, sorted and unique.
    pub fn bonds(&self) -> Result<Vec<(u32, u32)>, SystemError> {
        let mut bonds = Vec::new();
        match *self {
            Lattice::Chain { n_sites, periodic } => {
                if n_sites == 0 {
                    return Err(SystemError::InvalidLattice("chain without sites".into()));
                }
                for (i, j) in (0..n_sites).tuple_windows() {
                    bonds.push((i, j));
                }
                // A ring of two sites would repeat the only bond.
                if periodic && n_sites > 2 {
                    bonds.push((0, n_sites - 1));
                }
            }
            Lattice::Square { nx, ny, periodic } => {
                if nx == 0 || ny == 0 {
                    return Err(SystemError::InvalidLattice(format!(
                        "square lattice {}x{}",
                        nx, ny
                    )));
                }
                let site = |x: u32, y: u32| x + nx * y;
                for (y, x) in (0..ny).cartesian_product(0..nx) {
                    if x + 1 < nx {
                        bonds.push((site(x, y), site(x + 1, y)));
                    } else if periodic && nx > 2 {
                        bonds.push((site(0, y), site(x, y)));
                    }
                    if y + 1 < ny {
                        bonds.push((site(x, y), site(x, y + 1)));
                    } else if periodic && ny > 2 {
                        bonds.push((site(x, 0), site(x, y)));
                    }
                }
            }
        }
        let mut bonds: Vec<(u32, u32)> = bonds
            .into_iter()
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        bonds.sort_unstable();
        bonds.dedup();
        Ok(bonds)
    }
}

/// Model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubbardParams {
    pub lattice: Lattice,
    pub t: f64,
    pub u: f64,
    #[serde(default)]
    pub v: f64,
    /// On-site energies, one per site; empty means all zero.
    #[serde(default)]
    pub onsite: Vec<f64>,
    pub n_up: u32,
    pub n_dn: u32,
}

pub struct HubbardSystem {
    params: HubbardParams,
    bonds: HashSet<(u32, u32)>,
    neighbors: Vec<Vec<u32>>,
    onsite: Vec<f64>,
    data: SystemData,
}

impl HubbardSystem {
    pub fn new(params: HubbardParams) -> Result<Self, SystemError> {
        let n_sites = params.lattice.n_sites();
        if params.n_up > n_sites || params.n_dn > n_sites {
            return Err(SystemError::InvalidLattice(format!(
                "{} up / {} down electrons do not fit on {} sites",
                params.n_up, params.n_dn, n_sites
            )));
        }
        let onsite = if params.onsite.is_empty() {
            vec![0.0; n_sites as usize]
        } else if params.onsite.len() == n_sites as usize {
            params.onsite.clone()
        } else {
            return Err(SystemError::InvalidLattice(format!(
                "{} on-site energies for {} sites",
                params.onsite.len(),
                n_sites
            )));
        };

        let bond_list = params.lattice.bonds()?;
        let mut neighbors = vec![Vec::new(); n_sites as usize];
        for &(a, b) in &bond_list {
            neighbors[a as usize].push(b);
            neighbors[b as usize].push(a);
        }

        Ok(HubbardSystem {
            data: SystemData::new(params.n_up, params.n_dn),
            bonds: bond_list.into_iter().collect(),
            neighbors,
            onsite,
            params,
        })
    }

    pub fn n_sites(&self) -> u32 {
        self.params.lattice.n_sites()
    }

    fn is_bond(&self, a: u32, b: u32) -> bool {
        let key = if a < b { (a, b) } else { (b, a) };
        self.bonds.contains(&key)
    }

    /// Up electrons fill even sites first, down electrons odd sites first.
    pub fn reference_det(&self) -> Det {
        let n = self.n_sites();
        let evens_first = (0..n).step_by(2).chain((1..n).step_by(2));
        let odds_first = (1..n).step_by(2).chain((0..n).step_by(2));
        Det::new(
            HalfDet::from_orbs(evens_first.take(self.params.n_up as usize)),
            HalfDet::from_orbs(odds_first.take(self.params.n_dn as usize)),
        )
    }

    /// On-site energies plus same-spin V for one spin channel.
    pub fn same_spin_energy(&self, half: &HalfDet) -> f64 {
        let onsite: f64 = half.orbs().iter().map(|&i| self.onsite[i as usize]).sum();
        if self.params.v == 0.0 {
            return onsite;
        }
        let pairs = half
            .orbs()
            .iter()
            .tuple_combinations()
            .filter(|&(&a, &b)| self.is_bond(a, b))
            .count();
        onsite + self.params.v * pairs as f64
    }

    fn cross_spin_energy(&self, up: &HalfDet, dn: &HalfDet) -> f64 {
        let double_occ = up.orbs().iter().filter(|&&i| dn.has(i)).count();
        let mut energy = self.params.u * double_occ as f64;
        if self.params.v != 0.0 {
            let mut pairs = 0usize;
            for &i in up.orbs() {
                pairs += self.neighbors[i as usize]
                    .iter()
                    .filter(|&&j| dn.has(j))
                    .count();
            }
            energy += self.params.v * pairs as f64;
        }
        energy
    }

    fn cached_same_spin(&self, half: &HalfDet) -> f64 {
        self.data
            .diag_helper
            .get(half)
            .unwrap_or_else(|_| self.same_spin_energy(half))
    }

    pub fn diagonal(&self, det: &Det) -> f64 {
        self.cached_same_spin(&det.up)
            + self.cached_same_spin(&det.dn)
            + self.cross_spin_energy(&det.up, &det.dn)
    }

    fn hop_elem(&self, from: &HalfDet, to: &HalfDet) -> f64 {
        let (left_only, right_only) = from.diff(to);
        if left_only.len() != 1 || right_only.len() != 1 {
            return 0.0;
        }
        let (i, j) = (left_only[0], right_only[0]);
        if !self.is_bond(i, j) {
            return 0.0;
        }
        let sign = if from.n_occupied_between(i, j) % 2 == 0 {
            1.0
        } else {
            -1.0
        };
        -self.params.t * sign
    }
}

impl System for HubbardSystem {
    fn data(&self) -> &SystemData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut SystemData {
        &mut self.data
    }

    fn setup(&mut self) -> Result<(), SystemError> {
        let reference = self.reference_det();
        let energy_hf = self.same_spin_energy(&reference.up)
            + self.same_spin_energy(&reference.dn)
            + self.cross_spin_energy(&reference.up, &reference.dn);

        self.data = SystemData::new(self.params.n_up, self.params.n_dn);
        self.data.push_det(reference.clone(), 1.0)?;
        self.data.energy_hf = energy_hf;
        self.data.energy_var = energy_hf;

        info!(
            "Hubbard system: {} sites, {} bonds, n_up = {}, n_dn = {}",
            self.n_sites(),
            self.bonds.len(),
            self.params.n_up,
            self.params.n_dn
        );
        info!(
            "Reference determinant {} with energy {:.10}",
            reference, energy_hf
        );
        Ok(())
    }

    fn find_connected_dets(
        &self,
        det: &Det,
        eps_max: f64,
        eps_min: f64,
        handler: &mut dyn FnMut(&Det, u32),
    ) {
        if eps_max == f64::INFINITY {
            handler(det, 0);
        }

        let magnitude = self.params.t.abs();
        if !(magnitude > eps_min && magnitude <= eps_max) {
            return;
        }

        for &i in det.up.orbs() {
            for &j in &self.neighbors[i as usize] {
                if let Some(up) = det.up.excite(i, j) {
                    handler(&Det::new(up, det.dn.clone()), 1);
                }
            }
        }
        for &i in det.dn.orbs() {
            for &j in &self.neighbors[i as usize] {
                if let Some(dn) = det.dn.excite(i, j) {
                    handler(&Det::new(det.up.clone(), dn), 1);
                }
            }
        }
    }

    fn get_hamiltonian_elem(&self, det_i: &Det, det_j: &Det, n_excite: u32) -> f64 {
        match n_excite {
            0 => self.diagonal(det_i),
            1 => {
                let up_same = det_i.up == det_j.up;
                let dn_same = det_i.dn == det_j.dn;
                match (up_same, dn_same) {
                    (false, true) => self.hop_elem(&det_i.up, &det_j.up),
                    (true, false) => self.hop_elem(&det_i.dn, &det_j.dn),
                    _ => 0.0,
                }
            }
            _ => 0.0,
        }
    }

    fn update_diag_helper(&mut self) {
        let version = self.data.version();
        let missing: HashSet<&HalfDet> = self
            .data
            .dets()
            .iter()
            .flat_map(|det| [&det.up, &det.dn])
            .filter(|half| !self.data.diag_helper.contains(half))
            .collect();

        let computed: Vec<(HalfDet, f64)> = missing
            .into_par_iter()
            .map(|half| (half.clone(), self.same_spin_energy(half)))
            .collect();

        debug!(
            "Diagonal helper: {} new entries, {} total",
            computed.len(),
            self.data.diag_helper.len() + computed.len()
        );
        for (half, value) in computed {
            self.data.diag_helper.put(half, value);
        }
        self.data.diag_helper.mark_built(version);
    }

    fn post_variation(&mut self) {
        info!(
            "Variation finished: {} determinants, E_var = {:.10}, E_var - E_hf = {:.10}",
            self.data.n_dets(),
            self.data.energy_var,
            self.data.energy_var - self.data.energy_hf
        );
    }
}
