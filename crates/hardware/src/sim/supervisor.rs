//! Stream link to the external fault-injection supervisor.
//!
//! The wire format is the reference one: every message is a string token
//! framed by a 4-byte big-endian length prefix. Plan parameters arrive as
//! decimal tokens plus a cache name; reports go back as `0x%08X` tokens.
//!
//! The link is generic over any `Read + Write` stream so tests can drive
//! it over in-memory buffers; [`SupervisorLink::connect`] produces the TCP
//! variant with `TCP_NODELAY` set, as the supervisor expects interactive
//! latency.

use std::io::{Read, Write};
use std::net::TcpStream;

use log::{debug, info};

use crate::common::SimError;
use crate::core::injector::{InjectionEvent, InjectionPlan};

/// Framed-token stream to the supervisor process.
pub struct SupervisorLink<S> {
    stream: S,
}

impl SupervisorLink<TcpStream> {
    /// Connects to the supervisor over IPv4 TCP with `TCP_NODELAY`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Link`] when the connection or socket option
    /// fails.
    pub fn connect(host: &str, port: u16) -> Result<Self, SimError> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_nodelay(true)?;
        info!("connected to supervisor at {host}:{port}");
        Ok(Self { stream })
    }
}

impl<S: Read + Write> SupervisorLink<S> {
    /// Wraps an already-open stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Consumes the link, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Sends one token: 4-byte big-endian length, then the bytes.
    pub fn send_token(&mut self, token: &str) -> Result<(), SimError> {
        debug!("supervisor <- {token:?}");
        self.stream.write_all(&(token.len() as u32).to_be_bytes())?;
        self.stream.write_all(token.as_bytes())?;
        self.stream.flush()?;
        Ok(())
    }

    /// Receives one token.
    ///
    /// # Errors
    ///
    /// [`SimError::Link`] on stream failure, [`SimError::Token`] when the
    /// payload is not UTF-8.
    pub fn recv_token(&mut self) -> Result<String, SimError> {
        let mut header = [0u8; 4];
        self.stream.read_exact(&mut header)?;
        let len = u32::from_be_bytes(header) as usize;

        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload)?;
        let token = String::from_utf8(payload)
            .map_err(|e| SimError::Token(String::from_utf8_lossy(e.as_bytes()).into_owned()))?;
        debug!("supervisor -> {token:?}");
        Ok(token)
    }

    /// Receives one decimal token.
    pub fn recv_u64(&mut self) -> Result<u64, SimError> {
        let token = self.recv_token()?;
        token
            .trim()
            .parse::<u64>()
            .map_err(|_| SimError::Token(token))
    }

    /// Receives a full injection plan: sleep cycles, row, way, cache name,
    /// word index, in that order.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownCache`] for an unrecognized cache name, plus the
    /// token and link failures of the individual receives.
    pub fn recv_plan(&mut self) -> Result<InjectionPlan, SimError> {
        let sleep_cycles = self.recv_u64()?;
        info!("supervisor: sleeping for {sleep_cycles} cycles");
        let row = self.recv_u64()? as u32;
        let way = self.recv_u64()? as u32;
        let cache = self.recv_token()?.trim().parse()?;
        let word = self.recv_u64()? as u32;
        Ok(InjectionPlan {
            sleep_cycles,
            cache,
            row,
            way,
            word,
        })
    }

    /// Reports whether the injection target held a valid line.
    pub fn report_validity(&mut self, valid: bool) -> Result<(), SimError> {
        self.send_token(if valid { "1\n" } else { "0\n" })
    }

    /// Reports a fired injection: the actual instruction count, then the
    /// corrupted byte address, each as an eight-digit hex token.
    pub fn report_fire(&mut self, event: &InjectionEvent) -> Result<(), SimError> {
        self.send_token(&format!("0x{:08X}", event.insn_count))?;
        self.send_token(&format!("0x{:08X}", event.addr))
    }

    /// Reports the final instruction count of a run that never injected.
    pub fn report_final_count(&mut self, insn_count: u64) -> Result<(), SimError> {
        self.send_token(&format!("0x{insn_count:08X}\n"))
    }
}
