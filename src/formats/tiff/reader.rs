// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

use log::warn;

use super::entry::Entry;
use super::file::TiffFile;
use super::ifd::IFD;
use super::value::Value;
use super::{Result, TiffError, TIFF_MAGIC};
use crate::bits::Endian;
use crate::tags::is_sub_ifd_tag;

/// Upper bound on chained top-level directories, guards against pointer
/// cycles in the next-IFD links.
const MAX_CHAINED_IFDS: usize = 32;

/// Upper bound on sub-directory recursion.
const MAX_SUB_IFD_DEPTH: usize = 8;

/// Bounds-checked, endian-aware reads at absolute offsets into a buffer.
///
/// Every failed access carries the offending offset and a small byte window
/// so the error message points into the input.
pub struct ByteReader<'a> {
  buf: &'a [u8],
  endian: Endian,
}

macro_rules! checked_read {
  ($name:ident, $ty:ty, $width:expr) => {
    pub fn $name(&self, offset: usize) -> Result<$ty> {
      self.check(offset, $width)?;
      Ok(self.endian.$name(self.buf, offset))
    }
  };
}

impl<'a> ByteReader<'a> {
  pub fn new(buf: &'a [u8], endian: Endian) -> Self {
    Self { buf, endian }
  }

  pub fn endian(&self) -> Endian {
    self.endian
  }

  pub fn len(&self) -> usize {
    self.buf.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buf.is_empty()
  }

  fn check(&self, offset: usize, len: usize) -> Result<()> {
    if offset.checked_add(len).map_or(true, |end| end > self.buf.len()) {
      Err(self.malformed(offset, format!("read of {} bytes past buffer end", len)))
    } else {
      Ok(())
    }
  }

  pub(crate) fn malformed(&self, offset: usize, reason: impl Into<String>) -> TiffError {
    TiffError::malformed(self.buf, offset, reason)
  }

  checked_read!(read_u8, u8, 1);
  checked_read!(read_i8, i8, 1);
  checked_read!(read_u16, u16, 2);
  checked_read!(read_i16, i16, 2);
  checked_read!(read_u32, u32, 4);
  checked_read!(read_i32, i32, 4);
  checked_read!(read_f32, f32, 4);
  checked_read!(read_f64, f64, 8);

  pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
    self.check(offset, len)?;
    Ok(&self.buf[offset..offset + len])
  }
}

/// Decode a complete TIFF structure. The buffer origin must be the
/// byte-order mark; all offsets inside the file are relative to it.
pub(crate) fn decode_file(buf: &[u8]) -> Result<TiffFile> {
  let endian = parse_byte_order(buf)?;
  let reader = ByteReader::new(buf, endian);
  let magic = reader.read_u16(2)?;
  if magic != TIFF_MAGIC {
    return Err(reader.malformed(2, format!("invalid TIFF magic {}", magic)));
  }

  let mut next = reader.read_u32(4)? as usize;
  let mut chain = Vec::new();
  while next != 0 {
    if chain.len() >= MAX_CHAINED_IFDS {
      warn!("TIFF IFD chain exceeds {} directories, truncating walk", MAX_CHAINED_IFDS);
      break;
    }
    let (ifd, next_ifd) = read_ifd(&reader, next, 0)?;
    chain.push(ifd);
    next = next_ifd;
  }

  Ok(TiffFile { endian, chain })
}

/// Decode a single directory (and its sub-directories) at a known offset.
pub fn decode_ifd(buf: &[u8], offset: usize, endian: Endian) -> Result<IFD> {
  let reader = ByteReader::new(buf, endian);
  let (ifd, _) = read_ifd(&reader, offset, 0)?;
  Ok(ifd)
}

/// Check if buffer looks like a TIFF file
pub(crate) fn is_tiff(buf: &[u8]) -> bool {
  buf.len() >= 4
    && match parse_byte_order(buf) {
      Ok(endian) => endian.read_u16(buf, 2) == TIFF_MAGIC,
      Err(_) => false,
    }
}

fn parse_byte_order(buf: &[u8]) -> Result<Endian> {
  match buf.get(0..2) {
    Some(b"II") => Ok(Endian::Little),
    Some(b"MM") => Ok(Endian::Big),
    _ => Err(TiffError::malformed(buf, 0, "bad byte order")),
  }
}

fn read_ifd(reader: &ByteReader<'_>, offset: usize, depth: usize) -> Result<(IFD, usize)> {
  if depth > MAX_SUB_IFD_DEPTH {
    return Err(reader.malformed(offset, "sub-IFD nesting too deep"));
  }
  let count = reader.read_u16(offset)? as usize;
  let mut entries = Vec::with_capacity(count);
  for i in 0..count {
    let mut entry = Entry::parse(reader, offset + 2 + i * 12)?;
    if is_sub_ifd_tag(entry.tag) {
      // a pointer entry of the wrong shape is kept as its raw value
      if let Value::Long(offsets) = &entry.value {
        if offsets.len() == 1 {
          let (sub, _) = read_ifd(reader, offsets[0] as usize, depth + 1)?;
          entry.value = Value::Ifd(sub);
        }
      }
    }
    entries.push(entry);
  }
  let next = reader.read_u32(offset + 2 + count * 12)? as usize;
  Ok((IFD::new(entries), next))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn minimal_le_tiff() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"II");
    buf.extend_from_slice(&42u16.to_le_bytes());
    buf.extend_from_slice(&8u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&0x0100u16.to_le_bytes()); // tag
    buf.extend_from_slice(&3u16.to_le_bytes()); // SHORT
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&1920u16.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    buf
  }

  #[test]
  fn decodes_minimal_file() {
    let file = decode_file(&minimal_le_tiff()).unwrap();
    assert_eq!(file.endian, Endian::Little);
    assert_eq!(file.chain.len(), 1);
    assert_eq!(file.chain[0].entries[0].value, Value::Short(vec![1920]));
  }

  #[test]
  fn first_ifd_offset_need_not_be_eight() {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"MM");
    buf.extend_from_slice(&42u16.to_be_bytes());
    buf.extend_from_slice(&12u32.to_be_bytes()); // IFD0 after 4 bytes of filler
    buf.extend_from_slice(&[0xEE; 4]);
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&0x0101u16.to_be_bytes());
    buf.extend_from_slice(&3u16.to_be_bytes());
    buf.extend_from_slice(&1u32.to_be_bytes());
    buf.extend_from_slice(&1080u16.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&0u32.to_be_bytes());
    let file = decode_file(&buf).unwrap();
    assert_eq!(file.endian, Endian::Big);
    assert_eq!(file.chain[0].entries[0].value, Value::Short(vec![1080]));
  }

  #[test]
  fn bad_byte_order_is_rejected() {
    let err = decode_file(b"XX\x2A\x00\x08\x00\x00\x00").unwrap_err();
    match err {
      TiffError::MalformedData { reason, trace } => {
        assert_eq!(reason, "bad byte order");
        assert_eq!(trace.offset, 0);
      }
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[test]
  fn truncated_entry_table_is_rejected() {
    let mut buf = minimal_le_tiff();
    buf.truncate(14);
    assert!(matches!(decode_file(&buf), Err(TiffError::MalformedData { .. })));
  }

  #[test]
  fn error_message_carries_trace() {
    let err = decode_file(b"II\x2A\x00\xFF\xFF\xFF\xFF").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("at 4294967295"), "got: {}", msg);
    assert!(msg.contains("prev:"), "got: {}", msg);
    assert!(msg.contains("next:"), "got: {}", msg);
  }

  #[test]
  fn decode_ifd_at_offset() {
    let buf = minimal_le_tiff();
    let ifd = decode_ifd(&buf, 8, Endian::Little).unwrap();
    assert_eq!(ifd.entry_count(), 1);
  }

  #[test]
  fn sniffer_accepts_both_byte_orders() {
    assert!(is_tiff(b"II\x2A\x00"));
    assert!(is_tiff(b"MM\x00\x2A"));
    assert!(!is_tiff(b"GIF89a"));
  }
}
