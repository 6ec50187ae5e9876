//! Command-line arguments

use clap::Parser;

/// Serve the Hamiltonian action of a lattice model over TCP
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override the service port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Load the wavefunction from this file instead of running the variation
    #[arg(long)]
    pub load: Option<String>,

    /// Save the wavefunction to this file before serving
    #[arg(long)]
    pub save: Option<String>,

    /// Emulate this many ranks as threads of the current process
    #[arg(long)]
    pub local_ranks: Option<usize>,

    /// Stop after the variation instead of starting the service
    #[arg(long)]
    pub skip_server: bool,
}
