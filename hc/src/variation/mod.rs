//! Variational driver
//!
//! Grows the basis by screening connections against `eps / |c_i|` and relaxes
//! the coefficients by projecting with `1 - dt (H - E)`. Every rank runs the
//! driver on its own copy of the space; the collective multiply keeps them in
//! lockstep.

mod tests;

use crate::coordinator::Coordinator;
use crate::hamiltonian::{Hamiltonian, SparseHamiltonian};
use color_eyre::eyre::{bail, ensure, Result, WrapErr};
use det::{Det, System};
use nalgebra::DVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// Energy jumps beyond this mean the time step is too large for the spectrum.
const DE_MAX: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationOptions {
    /// Screening thresholds, applied in order.
    pub eps_schedule: Vec<f64>,
    pub dt: f64,
    pub max_steps: usize,
    pub e_tol: f64,
}

impl Default for VariationOptions {
    fn default() -> Self {
        VariationOptions {
            eps_schedule: vec![1e-2, 1e-3, 1e-4],
            dt: 0.05,
            max_steps: 5000,
            e_tol: 1e-10,
        }
    }
}

pub struct Variation<'a, C: Coordinator> {
    coordinator: &'a C,
    options: VariationOptions,
}

impl<'a, C: Coordinator> Variation<'a, C> {
    pub fn new(coordinator: &'a C, options: VariationOptions) -> Self {
        Variation {
            coordinator,
            options,
        }
    }

    /// Run the whole schedule and return the variational energy.
    pub fn run<S: System + Sync>(&self, system: &mut S) -> Result<f64> {
        ensure!(system.n_dets() > 0, "variation needs a set-up basis");
        ensure!(self.options.dt > 0.0, "time step must be positive");

        system.update_diag_helper();
        let mut energy = self.relax(system)?;
        for &eps in &self.options.eps_schedule {
            loop {
                let added = self.expand(system, eps)?;
                if added == 0 {
                    break;
                }
                system.update_diag_helper();
                energy = self.relax(system)?;
                if self.coordinator.is_leader() {
                    info!(
                        "eps = {:.2e}: {} determinants, E = {:.10}",
                        eps,
                        system.n_dets(),
                        energy
                    );
                }
            }
        }

        system.data_mut().energy_var = energy;
        system.post_variation();
        Ok(energy)
    }

    /// Append every connection whose coupling exceeds `eps / |c_i|` for some
    /// determinant `i` in the basis. Returns the number of new determinants.
    pub fn expand<S: System + Sync>(&self, system: &mut S, eps: f64) -> Result<usize> {
        let candidates: Vec<Vec<Det>> = {
            let data = system.data();
            let space = &*system;
            data.dets()
                .par_iter()
                .zip(data.coefs().par_iter())
                .map(|(det, &coef)| {
                    let mut found = Vec::new();
                    if coef == 0.0 {
                        return found;
                    }
                    let eps_min = eps / coef.abs();
                    space.find_connected_dets(det, f64::INFINITY, eps_min, &mut |connected, _| {
                        if !data.contains(connected) {
                            found.push(connected.clone());
                        }
                    });
                    found
                })
                .collect()
        };

        // Insertion follows determinant order so every rank grows the same basis.
        let mut added = 0;
        for det in candidates.into_iter().flatten() {
            if system.data_mut().push_det(det, 0.0)? {
                added += 1;
            }
        }
        debug!("Screening at eps = {:.2e} added {} determinants", eps, added);
        Ok(added)
    }

    /// Project towards the ground state within the current basis. The
    /// coefficients are stored back normalised; returns the final energy.
    pub fn relax<S: System + Sync>(&self, system: &mut S) -> Result<f64> {
        let (coefs, energy) = {
            let hamiltonian = SparseHamiltonian::new(&*system, self.coordinator);
            self.propagate(&hamiltonian, system.data().coefs())?
        };
        system
            .data_mut()
            .set_coefs(coefs)
            .wrap_err("Propagated vector does not match the basis")?;
        Ok(energy)
    }

    fn propagate<H: Hamiltonian>(
        &self,
        hamiltonian: &H,
        start: &[f64],
    ) -> Result<(Vec<f64>, f64)> {
        let dt = self.options.dt;
        let mut c = DVector::from_column_slice(start);
        let norm = c.norm();
        ensure!(norm > 0.0, "cannot propagate a zero vector");
        c /= norm;

        let mut e_prev = f64::NAN;
        for step in 0..self.options.max_steps {
            let hc = DVector::from_vec(hamiltonian.multiply(c.as_slice()));
            let e = c.dot(&hc);
            let de = (e - e_prev).abs();
            if de > DE_MAX || !e.is_finite() {
                bail!(
                    "energy jumped by {:.3e} at step {}; reduce the time step",
                    de,
                    step
                );
            }

            c -= (hc - &c * e) * dt;
            let norm = c.norm();
            c /= norm;

            if de < self.options.e_tol {
                debug!("Converged after {} steps, E = {:.12}", step + 1, e);
                return Ok((c.as_slice().to_vec(), e));
            }
            e_prev = e;
        }

        let hc = DVector::from_vec(hamiltonian.multiply(c.as_slice()));
        let e = c.dot(&hc);
        if self.coordinator.is_leader() {
            info!(
                "Propagation stopped after {} steps, E = {:.12}",
                self.options.max_steps, e
            );
        }
        Ok((c.as_slice().to_vec(), e))
    }
}
