//! Minimal client: fetch the coefficients, apply H once and report the
//! Rayleigh quotient.
//!
//! Usage: `cargo run --example hc_client -- <host:port> <n_dets>`

use color_eyre::eyre::{eyre, Result, WrapErr};
use hc::server::HcClient;

fn main() -> Result<()> {
    color_eyre::install()?;
    let mut args = std::env::args().skip(1);
    let address = args.next().unwrap_or_else(|| "127.0.0.1:2018".to_string());
    let n_dets: usize = args
        .next()
        .ok_or_else(|| eyre!("missing basis size"))?
        .parse()
        .wrap_err("basis size must be an integer")?;

    let mut client = HcClient::connect(address.as_str(), n_dets)?;
    let coefs = client.get_coefs()?;
    let hc = client.hc(&coefs)?;
    client.exit()?;

    let norm: f64 = coefs.iter().map(|c| c * c).sum();
    let energy: f64 = coefs.iter().zip(hc.iter()).map(|(c, h)| c * h).sum::<f64>() / norm;
    println!("n_dets = {}, <c|H|c> / <c|c> = {:.10}", n_dets, energy);
    Ok(())
}
