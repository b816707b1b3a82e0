//! In-memory supervisor stream.
//!
//! The supervisor link is generic over `Read + Write`, so tests drive it
//! with a canned input buffer and capture everything the core sends back.

use std::io::{Cursor, Read, Result, Write};

/// A duplex stream backed by two buffers: reads drain `input`, writes
/// append to `output`.
pub struct DuplexStream {
    input: Cursor<Vec<u8>>,
    /// Everything the link has sent, frames included.
    pub output: Vec<u8>,
}

impl DuplexStream {
    /// Creates a stream whose reads will yield `input`.
    pub fn new(input: Vec<u8>) -> Self {
        Self {
            input: Cursor::new(input),
            output: Vec::new(),
        }
    }
}

impl Read for DuplexStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.input.read(buf)
    }
}

impl Write for DuplexStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Frames a sequence of tokens the way the supervisor would send them:
/// each token prefixed by its 4-byte big-endian length.
pub fn frame_tokens(tokens: &[&str]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for token in tokens {
        bytes.extend_from_slice(&(token.len() as u32).to_be_bytes());
        bytes.extend_from_slice(token.as_bytes());
    }
    bytes
}

/// Splits captured output back into tokens, undoing the framing.
pub fn unframe_tokens(mut bytes: &[u8]) -> Vec<String> {
    let mut tokens = Vec::new();
    while bytes.len() >= 4 {
        let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let end = 4 + len.min(bytes.len() - 4);
        tokens.push(String::from_utf8_lossy(&bytes[4..end]).into_owned());
        bytes = &bytes[end..];
    }
    tokens
}
