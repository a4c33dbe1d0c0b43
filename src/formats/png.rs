// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

//! PNG chunk codec with `tEXt` accessors.
//!
//! A PNG is the 8-byte signature followed by length-prefixed, CRC-protected
//! chunks. Chunks are kept raw (type plus data); lengths and CRCs are
//! validated on decode and recomputed on encode, so well-formed files round
//! trip byte for byte.

use log::debug;
use thiserror::Error;

use crate::bits::ByteTrace;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

const CHUNK_TEXT: [u8; 4] = *b"tEXt";
const CHUNK_IEND: [u8; 4] = *b"IEND";

/// Error variants for the PNG codec
#[derive(Debug, Error, PartialEq)]
pub enum PngError {
  /// Input violates a structural invariant of the wire format
  #[error("Malformed PNG: {reason} {trace}")]
  MalformedData { reason: String, trace: ByteTrace },
}

impl PngError {
  fn malformed(buf: &[u8], offset: usize, reason: impl Into<String>) -> Self {
    Self::MalformedData {
      reason: reason.into(),
      trace: ByteTrace::capture(buf, offset),
    }
  }
}

/// Result type for PNG codec results
pub type Result<T> = std::result::Result<T, PngError>;

/// One chunk: 4-byte type and raw data. Length and CRC are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
  pub ty: [u8; 4],
  pub data: Vec<u8>,
}

impl Chunk {
  pub fn new(ty: [u8; 4], data: Vec<u8>) -> Self {
    Self { ty, data }
  }

  fn crc(&self) -> u32 {
    png_crc(self.ty.iter().chain(self.data.iter()).copied())
  }
}

/// A PNG file as its ordered chunk list.
#[derive(Debug, Clone, PartialEq)]
pub struct Png {
  pub chunks: Vec<Chunk>,
}

impl Png {
  pub fn decode(buf: &[u8]) -> Result<Self> {
    if buf.get(0..8) != Some(&PNG_SIGNATURE[..]) {
      return Err(PngError::malformed(buf, 0, "bad PNG signature"));
    }

    let mut chunks = Vec::new();
    let mut pos = 8;
    while pos < buf.len() {
      if pos + 8 > buf.len() {
        return Err(PngError::malformed(buf, pos, "chunk header is truncated"));
      }
      let len = u32::from_be_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]]) as usize;
      let ty: [u8; 4] = [buf[pos + 4], buf[pos + 5], buf[pos + 6], buf[pos + 7]];
      debug!("PNG chunk: {} at {}, {} bytes", String::from_utf8_lossy(&ty), pos, len);
      if pos + 12 + len > buf.len() {
        return Err(PngError::malformed(buf, pos, "chunk data is truncated"));
      }
      let data = buf[pos + 8..pos + 8 + len].to_vec();
      let declared_crc = u32::from_be_bytes([
        buf[pos + 8 + len],
        buf[pos + 9 + len],
        buf[pos + 10 + len],
        buf[pos + 11 + len],
      ]);
      let chunk = Chunk::new(ty, data);
      if chunk.crc() != declared_crc {
        return Err(PngError::malformed(buf, pos + 8 + len, "chunk CRC mismatch"));
      }
      chunks.push(chunk);
      pos += 12 + len;
    }

    Ok(Self { chunks })
  }

  /// Reassemble the byte stream, recomputing lengths and CRCs.
  pub fn encode(&self) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&PNG_SIGNATURE);
    for chunk in &self.chunks {
      out.extend_from_slice(&(chunk.data.len() as u32).to_be_bytes());
      out.extend_from_slice(&chunk.ty);
      out.extend_from_slice(&chunk.data);
      out.extend_from_slice(&chunk.crc().to_be_bytes());
    }
    out
  }

  /// Value of the `tEXt` chunk keyed `key`, if present.
  pub fn get_text(&self, key: &str) -> Option<String> {
    self
      .chunks
      .iter()
      .filter(|c| c.ty == CHUNK_TEXT)
      .find_map(|c| match split_text_data(&c.data) {
        Some((k, v)) if k == key.as_bytes() => Some(latin1_to_string(v)),
        _ => None,
      })
  }

  /// Insert or replace the `tEXt` chunk keyed `key`. A new chunk goes in
  /// right before IEND so it stays inside the chunk stream proper.
  pub fn set_text(&mut self, key: &str, value: &str) {
    let mut data = Vec::with_capacity(key.len() + 1 + value.len());
    data.extend_from_slice(key.as_bytes());
    data.push(0);
    data.extend(string_to_latin1(value));

    let existing = self
      .chunks
      .iter_mut()
      .filter(|c| c.ty == CHUNK_TEXT)
      .find(|c| matches!(split_text_data(&c.data), Some((k, _)) if k == key.as_bytes()));
    match existing {
      Some(chunk) => chunk.data = data,
      None => {
        let at = self.chunks.iter().position(|c| c.ty == CHUNK_IEND).unwrap_or(self.chunks.len());
        self.chunks.insert(at, Chunk::new(CHUNK_TEXT, data));
      }
    }
  }
}

/// Check if buffer looks like a PNG file
pub fn is_png(buf: &[u8]) -> bool {
  buf.get(0..8) == Some(&PNG_SIGNATURE[..])
}

/// Key and value halves of a `tEXt` payload, split at the first NUL.
fn split_text_data(data: &[u8]) -> Option<(&[u8], &[u8])> {
  let nul = data.iter().position(|&b| b == 0)?;
  Some((&data[..nul], &data[nul + 1..]))
}

fn latin1_to_string(bytes: &[u8]) -> String {
  bytes.iter().map(|&b| b as char).collect()
}

fn string_to_latin1(s: &str) -> impl Iterator<Item = u8> + '_ {
  s.chars().map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
}

const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0u32; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      k += 1;
    }
    out[n] = c;
    n += 1;
  }
  out
}

fn png_crc(iter: impl Iterator<Item = u8>) -> u32 {
  let mut crc = u32::MAX;
  for byte in iter {
    let i = (crc ^ u32::from(byte)) as u8 as usize;
    crc = CRC_TABLE[i] ^ (crc >> 8);
  }
  crc ^ u32::MAX
}
