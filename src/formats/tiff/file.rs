// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

use serde::{Deserialize, Serialize};

use super::ifd::IFD;
use super::{reader, writer, Result};
use crate::bits::Endian;

/// A decoded TIFF structure: byte order plus the chain of top-level
/// directories (IFD0, thumbnail IFD1, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TiffFile {
  pub endian: Endian,
  pub chain: Vec<IFD>,
}

impl TiffFile {
  pub fn new(endian: Endian, chain: Vec<IFD>) -> Self {
    Self { endian, chain }
  }

  /// Decode a buffer whose origin is the TIFF byte-order mark.
  pub fn decode(buf: &[u8]) -> Result<Self> {
    reader::decode_file(buf)
  }

  /// Serialize back to bytes. Re-decoding the result yields a structurally
  /// identical file: same order, same values, same byte order.
  pub fn encode(&self) -> Result<Vec<u8>> {
    writer::encode_file(self)
  }

  /// Check if buffer looks like a TIFF file
  pub fn is_tiff<T: AsRef<[u8]>>(buffer: T) -> bool {
    reader::is_tiff(buffer.as_ref())
  }

  pub fn root_ifd(&self) -> Option<&IFD> {
    self.chain.first()
  }
}
