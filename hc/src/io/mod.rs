//! Input/Output: logging setup and state-vector files

mod output;
mod wavefunction;

pub use output::setup_output;
pub use wavefunction::{install_wavefunction, save_wavefunction};
