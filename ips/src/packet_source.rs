//! Stand-in for the out-of-scope NFQUEUE/libnetfilter_queue boundary.
//!
//! `PacketSource` is the trait `main.rs` drives in its loop; `JsonlPacketSource`
//! is the one concrete adapter this repository ships, reading newline-delimited
//! JSON packet records (5-tuple plus a base64-encoded payload) from a file or
//! stdin. A real deployment would swap in an adapter backed by
//! `libnetfilter_queue` FFI without touching `ips-core` or this trait.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Stdin};
use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use serde::Deserialize;

use ips_core::model::Protocol;
use ips_core::PacketView;

/// An owned packet record: the same fields `PacketView` borrows, kept alive
/// for the duration of one `decide()` call.
#[derive(Debug, Clone)]
pub struct OwnedPacket {
    pub src_ip: String,
    pub dst_ip: String,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: Protocol,
    pub payload: Vec<u8>,
}

impl OwnedPacket {
    pub fn as_view(&self) -> PacketView<'_> {
        PacketView {
            src_ip: &self.src_ip,
            dst_ip: &self.dst_ip,
            src_port: self.src_port,
            dst_port: self.dst_port,
            protocol: self.protocol,
            payload: &self.payload,
        }
    }
}

pub trait PacketSource {
    /// Returns the next packet, or `Ok(None)` once the source is exhausted.
    fn next_packet(&mut self) -> Result<Option<OwnedPacket>>;
}

#[derive(Debug, Deserialize)]
struct RawPacket {
    src_ip: String,
    dst_ip: String,
    src_port: u16,
    dst_port: u16,
    #[serde(default)]
    protocol: Option<u8>,
    #[serde(default)]
    payload_b64: Option<String>,
}

fn decode_record(line: &str) -> Result<OwnedPacket> {
    let raw: RawPacket =
        serde_json::from_str(line).with_context(|| format!("parsing packet record: {line}"))?;
    let payload = match raw.payload_b64 {
        Some(encoded) => B64.decode(encoded.as_bytes()).context("decoding payload_b64")?,
        None => Vec::new(),
    };
    Ok(OwnedPacket {
        src_ip: raw.src_ip,
        dst_ip: raw.dst_ip,
        src_port: raw.src_port,
        dst_port: raw.dst_port,
        protocol: Protocol::from_number(raw.protocol.unwrap_or(0)),
        payload,
    })
}

/// Reads one JSON packet record per line from any `BufRead`.
pub struct JsonlPacketSource<R> {
    lines: Lines<R>,
}

impl JsonlPacketSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening packet source file {}", path.display()))?;
        Ok(Self { lines: BufReader::new(file).lines() })
    }
}

impl JsonlPacketSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self { lines: BufReader::new(std::io::stdin()).lines() }
    }
}

impl<R: BufRead> PacketSource for JsonlPacketSource<R> {
    fn next_packet(&mut self) -> Result<Option<OwnedPacket>> {
        loop {
            let line = match self.lines.next() {
                None => return Ok(None),
                Some(line) => line.context("reading packet source line")?,
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(Some(decode_record(trimmed)?));
        }
    }
}
