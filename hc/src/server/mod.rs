//! `Hc` service: exposes the state vector and `H · v` to one external client
//!
//! The leader owns the socket. Every command is read by the leader, broadcast
//! to the whole group behind a barrier and executed by every rank before the
//! next one is read, so ranks never see interleaved commands.

mod client;
pub mod protocol;
mod tests;

pub use client::HcClient;

use crate::coordinator::{
    all_succeeded, broadcast_chunked, broadcast_value, Coordinator, CHUNK_SIZE,
};
use crate::hamiltonian::Hamiltonian;
use color_eyre::eyre::{eyre, Result, WrapErr};
use det::System;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub use protocol::{ACK, COMMAND_FRAME};

pub const DEFAULT_PORT: u16 = 2018;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GetCoefs,
    Hc,
    Exit,
    Unknown(String),
}

impl Command {
    pub fn parse(text: &str) -> Command {
        match text {
            "getCoefs" => Command::GetCoefs,
            "Hc" => Command::Hc,
            "exit" => Command::Exit,
            other => Command::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Command::GetCoefs => "getCoefs",
            Command::Hc => "Hc",
            Command::Exit => "exit",
            Command::Unknown(text) => text,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    AwaitingConnection,
    AwaitingCommand,
    ServingCoefs,
    ServingMultiply,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    /// Doubles per broadcast round when shipping the client's vector.
    pub chunk_size: usize,
    pub log_dir: PathBuf,
}

impl Default for ServerOptions {
    fn default() -> Self {
        ServerOptions {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            chunk_size: CHUNK_SIZE,
            log_dir: PathBuf::from("."),
        }
    }
}

pub struct HcServer<'a, S: System + ?Sized, H: Hamiltonian, C: Coordinator> {
    system: &'a S,
    hamiltonian: &'a H,
    coordinator: &'a C,
    options: ServerOptions,
    state: ServerState,
    n_dets: usize,
}

impl<'a, S, H, C> HcServer<'a, S, H, C>
where
    S: System + ?Sized,
    H: Hamiltonian,
    C: Coordinator,
{
    /// The vector length served to the client is fixed here.
    pub fn new(
        system: &'a S,
        hamiltonian: &'a H,
        coordinator: &'a C,
        options: ServerOptions,
    ) -> Self {
        let n_dets = system.n_dets();
        HcServer {
            system,
            hamiltonian,
            coordinator,
            options,
            state: ServerState::AwaitingConnection,
            n_dets,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn n_dets(&self) -> usize {
        self.n_dets
    }

    /// Bind on the leader, then serve one client until `exit`.
    ///
    /// A bind failure on the leader makes every rank return an error.
    pub fn run(&mut self) -> Result<()> {
        let bound = if self.coordinator.is_leader() {
            let address = (self.options.host.as_str(), self.options.port);
            TcpListener::bind(address)
                .wrap_err_with(|| {
                    format!("Unable to bind {}:{}", self.options.host, self.options.port)
                })
                .map(Some)
        } else {
            Ok(None)
        };
        let listener = self.settle(bound)?;
        self.serve(listener)
    }

    /// Serve one client on an already bound listener. Only the leader's
    /// listener is used; other ranks pass `None`.
    pub fn serve(&mut self, listener: Option<TcpListener>) -> Result<()> {
        let is_leader = self.coordinator.is_leader();
        let accepted = self.accept(listener);
        let setup = self
            .open_log()
            .and_then(|log| accepted.map(|stream| (stream, log)));
        let (mut stream, mut log) = self.settle(setup)?;
        self.coordinator.barrier();
        self.state = ServerState::AwaitingCommand;
        info!(
            "Rank {} serving {} coefficients",
            self.coordinator.rank(),
            self.n_dets
        );

        // Leader-side I/O failure; the group is shut down before it is reported.
        let mut failure: Option<color_eyre::Report> = None;
        while self.state != ServerState::Closed {
            let mut text = String::new();
            if is_leader {
                text = if failure.is_some() {
                    Command::Exit.to_string()
                } else {
                    self.read_command(&mut stream, &mut failure)
                };
            }
            self.coordinator.barrier();
            broadcast_value(self.coordinator, &mut text)?;
            writeln!(log, "{}", text).wrap_err("Failed to write server log")?;
            log.flush().wrap_err("Failed to flush server log")?;

            match Command::parse(&text) {
                Command::GetCoefs => {
                    self.state = ServerState::ServingCoefs;
                    if is_leader {
                        let coefs = &self.system.data().coefs()[..self.n_dets];
                        if let Err(e) = protocol::write_f64s(leader_stream(&mut stream)?, coefs) {
                            failure = Some(eyre!(e).wrap_err("Failed to send coefficients"));
                        }
                    }
                    self.state = ServerState::AwaitingCommand;
                }
                Command::Hc => {
                    self.state = ServerState::ServingMultiply;
                    self.serve_multiply(&mut stream, &mut failure)?;
                    if self.state != ServerState::Closed {
                        self.state = ServerState::AwaitingCommand;
                    }
                }
                Command::Exit => {
                    self.state = ServerState::Closed;
                }
                Command::Unknown(text) => {
                    warn!("Ignoring unknown command {:?}", text);
                }
            }
        }

        info!("Rank {} leaving the Hc service", self.coordinator.rank());
        match failure {
            Some(report) => Err(report),
            None => Ok(()),
        }
    }

    fn accept(&self, listener: Option<TcpListener>) -> Result<Option<TcpStream>> {
        if !self.coordinator.is_leader() {
            return Ok(None);
        }
        let listener =
            listener.ok_or_else(|| eyre!("Leader started the Hc service without a listener"))?;
        if let Ok(address) = listener.local_addr() {
            info!("Hc service listening on {}", address);
        }
        let (stream, peer) = listener.accept().wrap_err("Failed to accept client")?;
        info!("Client connected from {}", peer);
        Ok(Some(stream))
    }

    /// Collective: every rank learns whether all ranks got through a setup
    /// step, and all of them fail together if one did not.
    fn settle<T>(&mut self, local: Result<T>) -> Result<T> {
        let ok = all_succeeded(self.coordinator, local.is_ok());
        if !ok {
            self.state = ServerState::Closed;
        }
        match local {
            Ok(_) if !ok => Err(eyre!(
                "Hc service setup failed on another rank; rank {} stops",
                self.coordinator.rank()
            )),
            other => other,
        }
    }

    fn read_command(
        &self,
        stream: &mut Option<TcpStream>,
        failure: &mut Option<color_eyre::Report>,
    ) -> String {
        let result = leader_stream(stream).and_then(|s| {
            protocol::read_command(s).wrap_err("Failed to read command")
        });
        match result {
            Ok(Some(text)) => {
                debug!("Received command {:?}", text);
                text
            }
            Ok(None) => {
                info!("Client closed the connection");
                Command::Exit.to_string()
            }
            Err(report) => {
                *failure = Some(report);
                Command::Exit.to_string()
            }
        }
    }

    fn serve_multiply(
        &mut self,
        stream: &mut Option<TcpStream>,
        failure: &mut Option<color_eyre::Report>,
    ) -> Result<()> {
        let is_leader = self.coordinator.is_leader();
        let mut vector = vec![0.0; self.n_dets];
        let mut received = true;
        if is_leader {
            let result = leader_stream(stream).and_then(|s| {
                s.write_all(ACK).wrap_err("Failed to send ACK")?;
                s.flush().wrap_err("Failed to send ACK")?;
                protocol::read_f64s(s, &mut vector).wrap_err("Failed to read vector")
            });
            if let Err(report) = result {
                *failure = Some(report);
                received = false;
            }
        }
        self.coordinator.barrier();
        broadcast_value(self.coordinator, &mut received)?;
        if !received {
            self.state = ServerState::Closed;
            return Ok(());
        }

        broadcast_chunked(self.coordinator, &mut vector, self.options.chunk_size);
        let result = self.hamiltonian.multiply(&vector);

        if is_leader {
            if let Err(e) = protocol::write_f64s(leader_stream(stream)?, &result) {
                *failure = Some(eyre!(e).wrap_err("Failed to send H·v"));
            }
        }
        Ok(())
    }

    fn open_log(&self) -> Result<File> {
        fs::create_dir_all(&self.options.log_dir).wrap_err_with(|| {
            format!("Unable to create log directory {:?}", self.options.log_dir)
        })?;
        let path = self
            .options
            .log_dir
            .join(format!("hc_server.{}.log", self.coordinator.rank()));
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .wrap_err_with(|| format!("Unable to open server log {:?}", path))
    }
}

fn leader_stream(stream: &mut Option<TcpStream>) -> Result<&mut TcpStream> {
    stream
        .as_mut()
        .ok_or_else(|| eyre!("No client connection on this rank"))
}
