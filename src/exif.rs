// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

//! Exif adapter: the framing around a TIFF inside a JPEG APP1 segment, and
//! the projection of known tags onto a friendly record.
//!
//! The record is deliberately small. Unknown entries found on decode are
//! ignored, absent fields stay `None`, and `None` fields are left out on
//! encode.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bits::{ByteTrace, Endian};
use crate::formats::jfif::Jfif;
use crate::formats::tiff::{TiffAscii, TiffError, TiffFile, Value, IFD};
use crate::tags::{ExifTag, TiffCommonTag};

/// APP1 payload header that announces an Exif block.
pub const EXIF_MARKER: [u8; 6] = [b'E', b'x', b'i', b'f', b'\0', b'\0'];

/// Encoding identifier emitted in front of a UserComment payload. Only the
/// ASCII profile is written; on decode the identifier is skipped unread.
const USER_COMMENT_ASCII: [u8; 8] = *b"ASCII\0\0\0";

const TAG_EXIF_VERSION: u16 = ExifTag::ExifVersion as u16;
const TAG_DATE_TIME_ORIGINAL: u16 = ExifTag::DateTimeOriginal as u16;
const TAG_USER_COMMENT: u16 = ExifTag::UserComment as u16;

/// Error variants for the Exif adapter
#[derive(Debug, Error, PartialEq)]
pub enum ExifError {
  /// Input violates a structural invariant of the framing
  #[error("Malformed Exif: {reason} {trace}")]
  MalformedData { reason: String, trace: ByteTrace },

  /// Caller-supplied record can not be serialized
  #[error("Invalid input: {0}")]
  InvalidInput(String),

  #[error(transparent)]
  Tiff(#[from] TiffError),
}

impl ExifError {
  fn malformed(buf: &[u8], offset: usize, reason: impl Into<String>) -> Self {
    Self::MalformedData {
      reason: reason.into(),
      trace: ByteTrace::capture(buf, offset),
    }
  }
}

/// Result type for Exif adapter results
pub type Result<T> = std::result::Result<T, ExifError>;

/// This struct contains the EXIF information projected from the sub-IFD.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exif {
  pub exif_version: Option<String>,
  pub date_time_original: Option<String>,
  pub user_comment: Option<String>,
}

impl Exif {
  pub fn is_empty(&self) -> bool {
    self.exif_version.is_none() && self.date_time_original.is_none() && self.user_comment.is_none()
  }

  /// Decode a framed APP1 payload (size word, `Exif\0\0`, TIFF bytes).
  pub fn decode(payload: &[u8]) -> Result<Self> {
    if payload.len() < 8 {
      return Err(ExifError::malformed(payload, 0, "Exif payload below minimum size"));
    }
    let size = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    if size != payload.len() {
      return Err(ExifError::malformed(
        payload,
        0,
        format!("Exif size field {} disagrees with payload length {}", size, payload.len()),
      ));
    }
    if payload[2..8] != EXIF_MARKER {
      return Err(ExifError::malformed(payload, 2, "missing Exif marker"));
    }
    let tiff = TiffFile::decode(&payload[8..])?;
    Ok(Self::from_tiff(&tiff))
  }

  /// Encode into a framed APP1 payload, TIFF part always little-endian.
  pub fn encode(&self) -> Result<Vec<u8>> {
    let tiff = self.to_tiff()?;
    let bytes = tiff.encode()?;
    let size = 8 + bytes.len();
    if size > u16::MAX as usize {
      return Err(ExifError::InvalidInput(format!("Exif payload of {} bytes exceeds APP1 capacity", size)));
    }
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&(size as u16).to_be_bytes());
    out.extend_from_slice(&EXIF_MARKER);
    out.extend_from_slice(&bytes);
    Ok(out)
  }

  /// Project the known tags out of the Exif sub-directory. Anything else
  /// in the file is ignored.
  pub fn from_tiff(tiff: &TiffFile) -> Self {
    let mut ins = Self::default();
    let sub = match tiff.root_ifd().and_then(|ifd0| ifd0.sub_ifd(TiffCommonTag::ExifIFDPointer)) {
      Some(sub) => sub,
      None => return ins,
    };
    for entry in &sub.entries {
      match (entry.tag, &entry.value) {
        (TAG_EXIF_VERSION, Value::Undefined(data)) if data.len() == 4 => {
          ins.exif_version = Some(String::from_utf8_lossy(data).into_owned());
        }
        (TAG_DATE_TIME_ORIGINAL, Value::Ascii(text)) => {
          ins.date_time_original = Some(text.as_str().into());
        }
        (TAG_USER_COMMENT, Value::Undefined(data)) if data.len() >= 8 => {
          ins.user_comment = Some(String::from_utf8_lossy(&data[8..]).into_owned());
        }
        (tag, _) => debug!("ignoring Exif entry {:#06x}", tag),
      }
    }
    ins
  }

  /// Build the single-IFD0 TIFF the frame wraps: one pointer entry whose
  /// sub-directory holds one entry per present record field.
  fn to_tiff(&self) -> Result<TiffFile> {
    let mut sub = IFD::default();
    if let Some(version) = &self.exif_version {
      if version.len() != 4 {
        return Err(ExifError::InvalidInput(format!(
          "ExifVersion must encode to exactly 4 bytes, got {}",
          version.len()
        )));
      }
      sub.push(ExifTag::ExifVersion, Value::Undefined(version.as_bytes().to_vec()));
    }
    if let Some(datetime) = &self.date_time_original {
      sub.push(ExifTag::DateTimeOriginal, Value::Ascii(TiffAscii::new(datetime)));
    }
    if let Some(comment) = &self.user_comment {
      let mut data = Vec::with_capacity(8 + comment.len());
      data.extend_from_slice(&USER_COMMENT_ASCII);
      data.extend_from_slice(comment.as_bytes());
      sub.push(ExifTag::UserComment, Value::Undefined(data));
    }
    let mut ifd0 = IFD::default();
    ifd0.push(TiffCommonTag::ExifIFDPointer, Value::Ifd(sub));
    Ok(TiffFile::new(Endian::Little, vec![ifd0]))
  }
}

/// Read the Exif record out of a JPEG. A stream without an APP1 segment
/// yields the empty record.
pub fn decode_jpg_exif(jfif: &Jfif) -> Result<Exif> {
  match jfif.app1() {
    Some(segment) => Exif::decode(&segment.data),
    None => Ok(Exif::default()),
  }
}

/// Replace the first APP1 segment's payload with a freshly framed record.
/// A stream without an APP1 segment is left untouched.
pub fn update_jpg_exif(jfif: &mut Jfif, exif: &Exif) -> Result<()> {
  if let Some(segment) = jfif.app1_mut() {
    segment.data = exif.encode()?;
  }
  Ok(())
}
