use crate::det::Det;
use crate::diag::DiagHelper;
use crate::error::SystemError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Read, Write};

/// State vector and per-space scalars shared by every configuration space.
///
/// Only `n_up, n_dn, dets, coefs, energy_hf, energy_var` are persisted, in that
/// order. The diagonal cache and the lookup index are rebuilt after parsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemData {
    pub n_up: u32,
    pub n_dn: u32,
    dets: Vec<Det>,
    coefs: Vec<f64>,
    pub energy_hf: f64,
    pub energy_var: f64,

    #[serde(skip)]
    pub n_elecs: u32,
    #[serde(skip)]
    pub diag_helper: DiagHelper,
    #[serde(skip)]
    index: HashSet<Det>,
    // Bumped whenever the set of determinants changes.
    #[serde(skip)]
    version: u64,
}

impl SystemData {
    pub fn new(n_up: u32, n_dn: u32) -> Self {
        SystemData {
            n_up,
            n_dn,
            n_elecs: n_up + n_dn,
            ..Default::default()
        }
    }

    pub fn dets(&self) -> &[Det] {
        &self.dets
    }

    pub fn coefs(&self) -> &[f64] {
        &self.coefs
    }

    pub fn set_coefs(&mut self, coefs: Vec<f64>) -> Result<(), SystemError> {
        if coefs.len() != self.dets.len() {
            return Err(SystemError::CoefLength {
                expected: self.dets.len(),
                got: coefs.len(),
            });
        }
        self.coefs = coefs;
        Ok(())
    }

    pub fn n_dets(&self) -> usize {
        self.dets.len()
    }

    pub fn contains(&self, det: &Det) -> bool {
        self.index.contains(det)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Append `det` with amplitude `coef`.
    ///
    /// Returns `Ok(false)` without touching the basis if `det` is already present.
    pub fn push_det(&mut self, det: Det, coef: f64) -> Result<bool, SystemError> {
        self.check_particles(&det)?;
        if self.index.contains(&det) {
            return Ok(false);
        }
        self.index.insert(det.clone());
        self.dets.push(det);
        self.coefs.push(coef);
        self.version += 1;
        Ok(true)
    }

    pub fn serialize_into<W: Write>(&self, writer: W) -> Result<(), SystemError> {
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn parse<R: Read>(reader: R) -> Result<Self, SystemError> {
        let mut data: SystemData = bincode::deserialize_from(reader)?;
        if data.dets.len() != data.coefs.len() {
            return Err(SystemError::CoefLength {
                expected: data.dets.len(),
                got: data.coefs.len(),
            });
        }
        data.n_elecs = data.n_up + data.n_dn;
        for det in &data.dets {
            data.check_particles(det)?;
            if !data.index.insert(det.clone()) {
                return Err(SystemError::DuplicateDet(det.clone()));
            }
        }
        data.version = 1;
        Ok(data)
    }

    fn check_particles(&self, det: &Det) -> Result<(), SystemError> {
        if det.n_up() != self.n_up as usize || det.n_dn() != self.n_dn as usize {
            return Err(SystemError::ParticleCount {
                det: det.clone(),
                n_up: self.n_up,
                n_dn: self.n_dn,
            });
        }
        Ok(())
    }
}

// Equality covers the persisted fields only; scalars compare bit for bit.
impl PartialEq for SystemData {
    fn eq(&self, other: &Self) -> bool {
        self.n_up == other.n_up
            && self.n_dn == other.n_dn
            && self.dets == other.dets
            && self.coefs.len() == other.coefs.len()
            && self
                .coefs
                .iter()
                .zip(other.coefs.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
            && self.energy_hf.to_bits() == other.energy_hf.to_bits()
            && self.energy_var.to_bits() == other.energy_var.to_bits()
    }
}

/// Contract every configuration space implements.
///
/// Solvers, the Hamiltonian operator and the `Hc` service only talk to a space
/// through this trait.
pub trait System {
    fn data(&self) -> &SystemData;

    fn data_mut(&mut self) -> &mut SystemData;

    /// Build the initial basis. Must run before any other operation.
    fn setup(&mut self) -> Result<(), SystemError>;

    /// Report every determinant connected to `det` whose coupling magnitude
    /// `m` satisfies `eps_min < m <= eps_max`.
    ///
    /// `det` itself is reported (with `n_excite = 0`) only when `eps_max` is
    /// infinite. The order of calls is unspecified and the enumeration cannot
    /// be resumed; call again to regenerate it.
    fn find_connected_dets(
        &self,
        det: &Det,
        eps_max: f64,
        eps_min: f64,
        handler: &mut dyn FnMut(&Det, u32),
    );

    /// `<det_i|H|det_j>` for a pair separated by `n_excite` excitations.
    fn get_hamiltonian_elem(&self, det_i: &Det, det_j: &Det, n_excite: u32) -> f64;

    /// Refresh the diagonal cache for the current basis.
    fn update_diag_helper(&mut self);

    fn post_variation(&mut self) {}

    fn post_perturbation(&mut self) {}

    fn n_dets(&self) -> usize {
        self.data().n_dets()
    }
}
