// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

use log::debug;
use serde::{Deserialize, Serialize};

use super::reader::ByteReader;
use super::value::{Rational, SRational, TiffAscii, Value};
use super::Result;

pub(crate) const TYPE_BYTE: u16 = 1;
pub(crate) const TYPE_ASCII: u16 = 2;
pub(crate) const TYPE_SHORT: u16 = 3;
pub(crate) const TYPE_LONG: u16 = 4;
pub(crate) const TYPE_RATIONAL: u16 = 5;
pub(crate) const TYPE_SBYTE: u16 = 6;
pub(crate) const TYPE_UNDEFINED: u16 = 7;
pub(crate) const TYPE_SSHORT: u16 = 8;
pub(crate) const TYPE_SLONG: u16 = 9;
pub(crate) const TYPE_SRATIONAL: u16 = 10;
pub(crate) const TYPE_FLOAT: u16 = 11;
pub(crate) const TYPE_DOUBLE: u16 = 12;

/// Element width in bytes for each of the 12 TIFF value types.
pub fn type_width(typ: u16) -> Option<usize> {
  match typ {
    TYPE_BYTE | TYPE_ASCII | TYPE_SBYTE | TYPE_UNDEFINED => Some(1),
    TYPE_SHORT | TYPE_SSHORT => Some(2),
    TYPE_LONG | TYPE_SLONG | TYPE_FLOAT => Some(4),
    TYPE_RATIONAL | TYPE_SRATIONAL | TYPE_DOUBLE => Some(8),
    _ => None,
  }
}

/// A single directory entry: tag plus typed payload.
///
/// The wire type code and element count are derived from the value variant,
/// so an entry can not get out of sync with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
  pub tag: u16,
  pub value: Value,
}

impl Entry {
  pub fn new(tag: u16, value: Value) -> Self {
    Self { tag, value }
  }

  pub fn value_type(&self) -> u16 {
    self.value.value_type()
  }

  pub fn count(&self) -> u32 {
    self.value.count() as u32
  }

  pub fn type_name(&self) -> String {
    self.value.value_type_name()
  }

  /// Decode the 12-byte record at `pos`. Payloads of 4 bytes or less live
  /// in the value field itself (trailing filler ignored), larger ones at
  /// the absolute offset the value field holds.
  pub(crate) fn parse(reader: &ByteReader<'_>, pos: usize) -> Result<Entry> {
    let tag = reader.read_u16(pos)?;
    let typ = reader.read_u16(pos + 2)?;
    let count = reader.read_u32(pos + 4)? as usize;

    debug!("TIFF entry tag: {:#06x}, type: {}, count: {}", tag, typ, count);

    let width = type_width(typ).ok_or_else(|| reader.malformed(pos + 2, format!("unknown TIFF type code {}", typ)))?;
    let byte_len = width
      .checked_mul(count)
      .ok_or_else(|| reader.malformed(pos + 4, "entry byte length overflows"))?;

    let payload = if byte_len <= 4 {
      pos + 8
    } else {
      reader.read_u32(pos + 8)? as usize
    };

    let value = match typ {
      TYPE_BYTE => Value::Byte(reader.read_bytes(payload, count)?.to_vec()),
      TYPE_ASCII => Value::Ascii(TiffAscii::new_from_raw(reader.read_bytes(payload, count)?)),
      TYPE_SHORT => {
        let mut v = Vec::with_capacity(count);
        for i in 0..count {
          v.push(reader.read_u16(payload + i * 2)?);
        }
        Value::Short(v)
      }
      TYPE_LONG => {
        let mut v = Vec::with_capacity(count);
        for i in 0..count {
          v.push(reader.read_u32(payload + i * 4)?);
        }
        Value::Long(v)
      }
      TYPE_RATIONAL => {
        let mut v = Vec::with_capacity(count);
        for i in 0..count {
          let n = reader.read_u32(payload + i * 8)?;
          let d = reader.read_u32(payload + i * 8 + 4)?;
          v.push(Rational::new(n, d));
        }
        Value::Rational(v)
      }
      TYPE_SBYTE => {
        let mut v = Vec::with_capacity(count);
        for i in 0..count {
          v.push(reader.read_i8(payload + i)?);
        }
        Value::SByte(v)
      }
      TYPE_UNDEFINED => Value::Undefined(reader.read_bytes(payload, count)?.to_vec()),
      TYPE_SSHORT => {
        let mut v = Vec::with_capacity(count);
        for i in 0..count {
          v.push(reader.read_i16(payload + i * 2)?);
        }
        Value::SShort(v)
      }
      TYPE_SLONG => {
        let mut v = Vec::with_capacity(count);
        for i in 0..count {
          v.push(reader.read_i32(payload + i * 4)?);
        }
        Value::SLong(v)
      }
      TYPE_SRATIONAL => {
        // numerator and denominator are signed, negative values must survive
        let mut v = Vec::with_capacity(count);
        for i in 0..count {
          let n = reader.read_i32(payload + i * 8)?;
          let d = reader.read_i32(payload + i * 8 + 4)?;
          v.push(SRational::new(n, d));
        }
        Value::SRational(v)
      }
      TYPE_FLOAT => {
        let mut v = Vec::with_capacity(count);
        for i in 0..count {
          v.push(reader.read_f32(payload + i * 4)?);
        }
        Value::Float(v)
      }
      // full 64-bit reads, not the FLOAT accessor
      TYPE_DOUBLE => {
        let mut v = Vec::with_capacity(count);
        for i in 0..count {
          v.push(reader.read_f64(payload + i * 8)?);
        }
        Value::Double(v)
      }
      _ => unreachable!("type code already validated"),
    };

    Ok(Entry { tag, value })
  }
}
