use super::protocol;
use super::Command;
use color_eyre::eyre::{ensure, Result, WrapErr};
use std::net::{TcpStream, ToSocketAddrs};

/// Client side of the `Hc` protocol. The caller must know the basis size.
pub struct HcClient {
    stream: TcpStream,
    n_dets: usize,
}

impl HcClient {
    pub fn connect<A: ToSocketAddrs>(address: A, n_dets: usize) -> Result<Self> {
        let stream = TcpStream::connect(address).wrap_err("Unable to reach the Hc service")?;
        Ok(HcClient { stream, n_dets })
    }

    pub fn n_dets(&self) -> usize {
        self.n_dets
    }

    /// Send a raw command frame.
    pub fn send(&mut self, command: &str) -> Result<()> {
        protocol::write_command(&mut self.stream, command)
            .wrap_err_with(|| format!("Failed to send {:?}", command))
    }

    pub fn get_coefs(&mut self) -> Result<Vec<f64>> {
        self.send(Command::GetCoefs.as_str())?;
        let mut coefs = vec![0.0; self.n_dets];
        protocol::read_f64s(&mut self.stream, &mut coefs).wrap_err("Failed to read coefficients")?;
        Ok(coefs)
    }

    pub fn hc(&mut self, vector: &[f64]) -> Result<Vec<f64>> {
        ensure!(
            vector.len() == self.n_dets,
            "vector has {} entries, the service expects {}",
            vector.len(),
            self.n_dets
        );
        self.send(Command::Hc.as_str())?;
        protocol::read_ack(&mut self.stream).wrap_err("Hc was not acknowledged")?;
        protocol::write_f64s(&mut self.stream, vector).wrap_err("Failed to send vector")?;
        let mut result = vec![0.0; self.n_dets];
        protocol::read_f64s(&mut self.stream, &mut result).wrap_err("Failed to read H·v")?;
        Ok(result)
    }

    pub fn exit(mut self) -> Result<()> {
        self.send(Command::Exit.as_str())
    }
}
