// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

//! TIFF directory-tree codec.
//!
//! A TIFF file is a header plus a linked chain of IFDs (Image File
//! Directories). Each directory entry is a fixed 12-byte record; payloads of
//! more than 4 bytes are spilled to an absolute offset elsewhere in the
//! buffer. Decoding resolves the pointer structure into an owned tree,
//! encoding plans a front region (entry records) and a back region (spilled
//! payloads) before writing a single byte, so that re-decoding the output
//! yields a structurally identical tree.

use thiserror::Error;

use crate::bits::ByteTrace;

pub mod entry;
pub mod file;
pub mod ifd;
pub mod reader;
pub mod value;
pub mod writer;

pub use entry::Entry;
pub use file::TiffFile;
pub use ifd::IFD;
pub use reader::{decode_ifd, ByteReader};
pub use value::{Rational, SRational, TiffAscii, Value};

pub(crate) const TIFF_MAGIC: u16 = 42;

/// Error variants for the TIFF codec
#[derive(Debug, Error, PartialEq)]
pub enum TiffError {
  /// Input violates a structural invariant of the wire format
  #[error("Malformed TIFF: {reason} {trace}")]
  MalformedData { reason: String, trace: ByteTrace },

  /// Caller-supplied structure can not be serialized
  #[error("Invalid input: {0}")]
  InvalidInput(String),
}

impl TiffError {
  pub(crate) fn malformed(buf: &[u8], offset: usize, reason: impl Into<String>) -> Self {
    Self::MalformedData {
      reason: reason.into(),
      trace: ByteTrace::capture(buf, offset),
    }
  }
}

/// Result type for TIFF codec results
pub type Result<T> = std::result::Result<T, TiffError>;
