//! Configuration for the Hc service
//!
//! The YAML file has a `system` section describing the model, plus optional
//! `variation`, `server` and `wavefunction` sections. Missing optional values
//! are filled by `with_defaults`.

mod args;

pub use args::Args;

use crate::coordinator::CHUNK_SIZE;
use crate::server::{ServerOptions, DEFAULT_PORT};
use crate::variation::VariationOptions;
use color_eyre::eyre::{Result, WrapErr};
use det::HubbardParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub system: HubbardParams,
    #[serde(default)]
    pub variation: VariationParams,
    #[serde(default)]
    pub server: ServerParams,
    #[serde(default)]
    pub wavefunction: WavefunctionParams,
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Config> {
        let config: Config =
            serde_yml::from_str(content).wrap_err("Failed to parse configuration file")?;
        Ok(config.with_defaults())
    }

    pub fn from_file(path: &str) -> Result<Config> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Unable to read configuration file: {}", path))?;
        Config::from_yaml(&content)
    }

    pub fn with_defaults(mut self) -> Self {
        self.variation = self.variation.with_defaults();
        self.server = self.server.with_defaults();
        self
    }

    /// Command-line values win over the file.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(port) = args.port {
            self.server.port = Some(port);
        }
        if let Some(ref path) = args.load {
            self.wavefunction.load = Some(path.into());
        }
        if let Some(ref path) = args.save {
            self.wavefunction.save = Some(path.into());
        }
    }
}

/// Variational driver parameters
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct VariationParams {
    pub eps_schedule: Option<Vec<f64>>,
    pub dt: Option<f64>,
    pub max_steps: Option<usize>,
    pub e_tol: Option<f64>,
}

impl VariationParams {
    pub fn with_defaults(mut self) -> Self {
        let defaults = VariationOptions::default();
        if self.eps_schedule.is_none() {
            self.eps_schedule = Some(defaults.eps_schedule);
        }
        if self.dt.is_none() {
            self.dt = Some(defaults.dt);
        }
        if self.max_steps.is_none() {
            self.max_steps = Some(defaults.max_steps);
        }
        if self.e_tol.is_none() {
            self.e_tol = Some(defaults.e_tol);
        }
        self
    }

    pub fn options(&self) -> VariationOptions {
        let defaults = VariationOptions::default();
        VariationOptions {
            eps_schedule: self.eps_schedule.clone().unwrap_or(defaults.eps_schedule),
            dt: self.dt.unwrap_or(defaults.dt),
            max_steps: self.max_steps.unwrap_or(defaults.max_steps),
            e_tol: self.e_tol.unwrap_or(defaults.e_tol),
        }
    }
}

/// Socket service parameters
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ServerParams {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub chunk_size: Option<usize>,
    pub log_dir: Option<PathBuf>,
}

impl ServerParams {
    pub fn with_defaults(mut self) -> Self {
        if self.host.is_none() {
            self.host = Some("0.0.0.0".to_string());
        }
        if self.port.is_none() {
            self.port = Some(DEFAULT_PORT);
        }
        if self.chunk_size.is_none() {
            self.chunk_size = Some(CHUNK_SIZE);
        }
        if self.log_dir.is_none() {
            self.log_dir = Some(PathBuf::from("."));
        }
        self
    }

    pub fn options(&self) -> ServerOptions {
        let defaults = ServerOptions::default();
        ServerOptions {
            host: self.host.clone().unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            log_dir: self.log_dir.clone().unwrap_or(defaults.log_dir),
        }
    }
}

/// Where to read and write the state vector
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct WavefunctionParams {
    pub load: Option<PathBuf>,
    pub save: Option<PathBuf>,
}
