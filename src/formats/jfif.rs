// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

//! JPEG segment codec.
//!
//! A JPEG stream is a sequence of `0xFF`-introduced marker segments. The
//! codec keeps every segment's payload raw (length bytes included) so that
//! re-encoding the list reproduces the input byte for byte. The
//! entropy-coded scan data after SOS is absorbed into the SOS segment up to
//! the next non-stuffed marker.

use log::debug;
use thiserror::Error;

use crate::bits::ByteTrace;

/// Start of image
pub const MARKER_SOI: u8 = 0xD8;
/// End of image
pub const MARKER_EOI: u8 = 0xD9;
/// Start of scan
pub const MARKER_SOS: u8 = 0xDA;
/// Application segment 0 (JFIF header)
pub const MARKER_APP0: u8 = 0xE0;
/// Application segment 1 (Exif, XMP)
pub const MARKER_APP1: u8 = 0xE1;

/// Error variants for the JPEG segment codec
#[derive(Debug, Error, PartialEq)]
pub enum JfifError {
  /// Input violates a structural invariant of the wire format
  #[error("Malformed JPEG: {reason} {trace}")]
  MalformedData { reason: String, trace: ByteTrace },
}

impl JfifError {
  fn malformed(buf: &[u8], offset: usize, reason: impl Into<String>) -> Self {
    Self::MalformedData {
      reason: reason.into(),
      trace: ByteTrace::capture(buf, offset),
    }
  }
}

/// Result type for JPEG codec results
pub type Result<T> = std::result::Result<T, JfifError>;

/// One marker segment. `marker` is the byte after the `0xFF` introducer;
/// `data` is everything up to the next marker, length bytes included.
/// Marker-only segments (SOI, EOI, RSTn, TEM) carry no data.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
  pub marker: u8,
  pub data: Vec<u8>,
}

/// A JPEG stream as its ordered segment list.
#[derive(Debug, Clone, PartialEq)]
pub struct Jfif {
  pub segments: Vec<Segment>,
}

impl Jfif {
  pub fn decode(buf: &[u8]) -> Result<Self> {
    if buf.get(0..2) != Some(&[0xFF, MARKER_SOI][..]) {
      return Err(JfifError::malformed(buf, 0, "first marker must be SOI"));
    }

    let mut segments = Vec::new();
    let mut pos = 0;
    loop {
      if pos + 2 > buf.len() {
        return Err(JfifError::malformed(buf, pos, "unexpected end of segment stream"));
      }
      if buf[pos] != 0xFF {
        return Err(JfifError::malformed(buf, pos, "expected marker introducer"));
      }
      let marker = buf[pos + 1];
      debug!("JPEG marker: {:#04x} at {}", marker, pos);
      pos += 2;

      let data = match marker {
        MARKER_SOI | MARKER_EOI | 0x01 | 0xD0..=0xD7 => Vec::new(),
        MARKER_SOS => {
          let header = read_sized_payload(buf, pos)?;
          pos += header.len();
          let scan_end = scan_entropy_coded(buf, pos)?;
          let mut data = header;
          data.extend_from_slice(&buf[pos..scan_end]);
          pos = scan_end;
          data
        }
        _ => {
          let data = read_sized_payload(buf, pos)?;
          pos += data.len();
          data
        }
      };
      segments.push(Segment { marker, data });

      if marker == MARKER_EOI {
        break;
      }
    }

    Ok(Self { segments })
  }

  /// Reassemble the byte stream; the identity of `decode` for valid input.
  pub fn encode(&self) -> Vec<u8> {
    let mut out = Vec::new();
    for segment in &self.segments {
      out.push(0xFF);
      out.push(segment.marker);
      out.extend_from_slice(&segment.data);
    }
    out
  }

  /// First APP1 segment, the Exif carrier when present.
  pub fn app1(&self) -> Option<&Segment> {
    self.segments.iter().find(|s| s.marker == MARKER_APP1)
  }

  pub fn app1_mut(&mut self) -> Option<&mut Segment> {
    self.segments.iter_mut().find(|s| s.marker == MARKER_APP1)
  }
}

/// Check if buffer looks like a JPEG stream
pub fn is_jfif(buf: &[u8]) -> bool {
  buf.len() >= 2 && buf[0] == 0xFF && buf[1] == MARKER_SOI
}

fn read_sized_payload(buf: &[u8], pos: usize) -> Result<Vec<u8>> {
  if pos + 2 > buf.len() {
    return Err(JfifError::malformed(buf, pos, "segment length is truncated"));
  }
  let len = u16::from_be_bytes([buf[pos], buf[pos + 1]]) as usize;
  if len < 2 {
    return Err(JfifError::malformed(buf, pos, "segment length below minimum"));
  }
  if pos + len > buf.len() {
    return Err(JfifError::malformed(buf, pos, "segment payload is truncated"));
  }
  Ok(buf[pos..pos + len].to_vec())
}

/// Find the end of the entropy-coded data starting at `pos`: the first
/// `0xFF` followed by a byte that is neither a stuffed zero nor a restart
/// marker.
fn scan_entropy_coded(buf: &[u8], pos: usize) -> Result<usize> {
  let mut p = pos;
  loop {
    if p + 2 > buf.len() {
      return Err(JfifError::malformed(buf, p, "entropy-coded data is not terminated"));
    }
    if buf[p] == 0xFF {
      let next = buf[p + 1];
      if next != 0x00 && !(0xD0..=0xD7).contains(&next) {
        return Ok(p);
      }
      p += 2;
    } else {
      p += 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_jpeg() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&[0xFF, 0xD8]); // SOI
    buf.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x4A, 0x46]); // APP0
    buf.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x04, 0x01, 0x00]); // SOS header
    buf.extend_from_slice(&[0x12, 0xFF, 0x00, 0x34, 0xFF, 0xD0, 0x56]); // scan data
    buf.extend_from_slice(&[0xFF, 0xD9]); // EOI
    buf
  }

  #[test]
  fn roundtrip_is_byte_exact() {
    let bytes = sample_jpeg();
    let jfif = Jfif::decode(&bytes).unwrap();
    assert_eq!(jfif.encode(), bytes);
  }

  #[test]
  fn segments_are_classified() {
    let jfif = Jfif::decode(&sample_jpeg()).unwrap();
    let markers: Vec<u8> = jfif.segments.iter().map(|s| s.marker).collect();
    assert_eq!(markers, vec![0xD8, 0xE0, 0xDA, 0xD9]);
    assert!(jfif.segments[0].data.is_empty());
    assert_eq!(jfif.segments[1].data, vec![0x00, 0x04, 0x4A, 0x46]);
  }

  #[test]
  fn sos_absorbs_stuffed_bytes_and_restarts() {
    let jfif = Jfif::decode(&sample_jpeg()).unwrap();
    let sos = &jfif.segments[2];
    assert_eq!(sos.data, vec![0x00, 0x04, 0x01, 0x00, 0x12, 0xFF, 0x00, 0x34, 0xFF, 0xD0, 0x56]);
  }

  #[test]
  fn missing_soi_is_rejected() {
    let err = Jfif::decode(&[0x00, 0x01, 0x02]).unwrap_err();
    assert!(matches!(err, JfifError::MalformedData { .. }));
  }

  #[test]
  fn truncated_scan_is_rejected() {
    let mut bytes = sample_jpeg();
    bytes.truncate(bytes.len() - 2); // drop EOI
    assert!(matches!(Jfif::decode(&bytes), Err(JfifError::MalformedData { .. })));
  }

  #[test]
  fn app1_lookup_finds_first() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&[0xFF, 0xD8]);
    buf.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x03, 0xAA]);
    buf.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x03, 0xBB]);
    buf.extend_from_slice(&[0xFF, 0xD9]);
    let jfif = Jfif::decode(&buf).unwrap();
    assert_eq!(jfif.app1().unwrap().data, vec![0x00, 0x03, 0xAA]);
  }

  #[test]
  fn sniffer() {
    assert!(is_jfif(&[0xFF, 0xD8, 0xFF, 0xE0]));
    assert!(!is_jfif(b"II\x2A\x00"));
  }
}
