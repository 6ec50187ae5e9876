//! State-vector files
//!
//! The file holds the persisted part of `SystemData` (electron counts,
//! determinants, coefficients and the two energies), bincode encoded.

use color_eyre::eyre::{ensure, Result, WrapErr};
use det::{System, SystemData};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub fn save_wavefunction<S: System + ?Sized>(system: &S, path: &Path) -> Result<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("Unable to create wavefunction file {:?}", path))?;
    let mut writer = BufWriter::new(file);
    system
        .data()
        .serialize_into(&mut writer)
        .wrap_err("Failed to encode wavefunction")?;
    writer.flush()?;
    info!("Saved {} determinants to {:?}", system.n_dets(), path);
    Ok(())
}

/// Replace the space's state with an encoded wavefunction.
pub fn install_wavefunction<S: System + ?Sized>(system: &mut S, bytes: &[u8]) -> Result<()> {
    let data = SystemData::parse(bytes).wrap_err("Invalid wavefunction")?;
    let current = system.data();
    ensure!(
        data.n_up == current.n_up && data.n_dn == current.n_dn,
        "wavefunction has {} up / {} down electrons, the model has {} / {}",
        data.n_up,
        data.n_dn,
        current.n_up,
        current.n_dn
    );
    *system.data_mut() = data;
    system.update_diag_helper();
    Ok(())
}
