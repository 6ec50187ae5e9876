//! Process entry: configuration, rank selection and the per-rank workflow

mod runner;
mod tests;

pub use runner::run_rank;

use crate::config::{Args, Config};
use crate::coordinator::LocalGroup;
use crate::io::setup_output;
use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;

pub struct HcApplication {
    args: Args,
    config: Config,
}

impl HcApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let mut config = Config::from_file(&args.config_file)?;
        config.apply_args(&args);
        Ok(Self { args, config })
    }

    pub fn new(args: Args, config: Config) -> Self {
        Self { args, config }
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref());
        info!("Configuration loaded:\n{:?}", self.config);

        let skip_server = self.args.skip_server;
        match self.args.local_ranks {
            Some(n_ranks) if n_ranks > 1 => {
                info!("Running {} ranks as local threads", n_ranks);
                let config = &self.config;
                LocalGroup::run(n_ranks, |c| run_rank(&c, config, skip_server))
                    .into_iter()
                    .collect::<Result<Vec<()>>>()?;
                Ok(())
            }
            _ => self.run_group(skip_server),
        }
    }

    #[cfg(feature = "mpi")]
    fn run_group(&self, skip_server: bool) -> Result<()> {
        let world = crate::coordinator::MpiCoordinator::init()?;
        run_rank(&world, &self.config, skip_server)
    }

    #[cfg(not(feature = "mpi"))]
    fn run_group(&self, skip_server: bool) -> Result<()> {
        run_rank(
            &crate::coordinator::SingleProcess,
            &self.config,
            skip_server,
        )
    }
}
