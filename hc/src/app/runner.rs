use crate::config::Config;
use crate::coordinator::{all_succeeded, Coordinator};
use crate::hamiltonian::SparseHamiltonian;
use crate::io::{install_wavefunction, save_wavefunction};
use crate::server::HcServer;
use crate::variation::Variation;
use color_eyre::eyre::{ensure, Result, WrapErr};
use det::{HubbardSystem, System};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Everything one rank does: build the space, obtain a state vector, then
/// serve it until the client sends `exit`.
pub fn run_rank<C: Coordinator>(
    coordinator: &C,
    config: &Config,
    skip_server: bool,
) -> Result<()> {
    let mut system =
        HubbardSystem::new(config.system.clone()).wrap_err("Invalid model parameters")?;
    system.setup().wrap_err("Failed to set up the model")?;

    match config.wavefunction.load {
        Some(ref path) => load_on_leader(coordinator, &mut system, path)?,
        None => {
            Variation::new(coordinator, config.variation.options()).run(&mut system)?;
        }
    }

    if coordinator.is_leader() {
        let data = system.data();
        info!(
            "State vector ready: {} determinants, E_hf = {:.10}, E_var = {:.10}",
            data.n_dets(),
            data.energy_hf,
            data.energy_var
        );
    }
    let saved = match config.wavefunction.save {
        Some(ref path) if coordinator.is_leader() => save_wavefunction(&system, path),
        _ => Ok(()),
    };
    let all_saved = all_succeeded(coordinator, saved.is_ok());
    saved?;
    ensure!(all_saved, "Leader failed to save the wavefunction");

    if skip_server {
        return Ok(());
    }

    let hamiltonian = SparseHamiltonian::new(&system, coordinator);
    let mut server = HcServer::new(&system, &hamiltonian, coordinator, config.server.options());
    server.run()
}

/// The leader reads the file and ships its bytes so other ranks need not see
/// the same filesystem.
fn load_on_leader<C: Coordinator>(
    coordinator: &C,
    system: &mut HubbardSystem,
    path: &Path,
) -> Result<()> {
    let mut read_error = None;
    let mut bytes = Vec::new();
    if coordinator.is_leader() {
        match fs::read(path) {
            Ok(content) => bytes = content,
            Err(e) => {
                warn!("Unable to read wavefunction file {:?}: {}", path, e);
                read_error = Some(e);
            }
        }
    }
    coordinator.broadcast_bytes(&mut bytes);
    if let Some(e) = read_error {
        return Err(e).wrap_err_with(|| format!("Unable to read wavefunction file {:?}", path));
    }
    install_wavefunction(system, &bytes)
        .wrap_err_with(|| format!("Failed to load wavefunction from {:?}", path))?;
    if coordinator.is_leader() {
        info!("Loaded {} determinants from {:?}", system.n_dets(), path);
    }
    Ok(())
}
