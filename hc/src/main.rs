//! Hc service command-line interface
//!
//! Builds the model from a YAML configuration, obtains a state vector and
//! serves it until the client disconnects.

use color_eyre::eyre::Result;
use hc::app::HcApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    HcApplication::from_cli()?.run()
}
