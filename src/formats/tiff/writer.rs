// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

//! Two-region TIFF encoder.
//!
//! Entry records have a fixed 12-byte shape, but each record's value field
//! must hold either the payload itself (4 bytes or less) or an absolute
//! offset into the back region, which depends on the sizes of all payloads
//! spilled before it. The writer therefore plans `(front, back)` sizes for
//! the whole tree first, allocates once, and then walks the tree with two
//! cursors into the same buffer.

use super::file::TiffFile;
use super::ifd::IFD;
use super::value::Value;
use super::{Result, TiffError, TIFF_MAGIC};
use crate::bits::Endian;

/// Planned byte sizes of one directory: `front` is the fixed record area
/// (count word, entries, next-IFD word), `back` the spilled payloads plus
/// any nested directories in full.
#[derive(Debug, Clone, Copy)]
struct Layout {
  front: usize,
  back: usize,
}

impl Layout {
  fn total(&self) -> usize {
    self.front + self.back
  }
}

fn plan_ifd(ifd: &IFD) -> Layout {
  let front = 2 + ifd.entries.len() * 12 + 4;
  let mut back = 0;
  for entry in &ifd.entries {
    match &entry.value {
      Value::Ifd(sub) => back += plan_ifd(sub).total(),
      value => {
        let size = value.byte_size();
        if size > 4 {
          back += size;
        }
      }
    }
  }
  Layout { front, back }
}

pub(crate) fn encode_file(file: &TiffFile) -> Result<Vec<u8>> {
  let layouts: Vec<Layout> = file.chain.iter().map(plan_ifd).collect();
  let front_total: usize = layouts.iter().map(|l| l.front).sum();
  let back_total: usize = layouts.iter().map(|l| l.back).sum();

  let mut writer = TiffWriter::new(file.endian, 8 + front_total + back_total);
  writer.write_header(if file.chain.is_empty() { 0 } else { 8 })?;

  let mut front = 8;
  let mut back = 8 + front_total;
  for (i, (ifd, layout)) in file.chain.iter().zip(&layouts).enumerate() {
    let next_ifd = if i + 1 == file.chain.len() {
      0
    } else {
      // fronts are laid out contiguously, so the next directory starts
      // right after this one's record area
      front + layout.front
    };
    writer.write_ifd(ifd, front, back, next_ifd as u32)?;
    front += layout.front;
    back += layout.back;
  }

  Ok(writer.into_inner())
}

struct TiffWriter {
  buf: Vec<u8>,
  endian: Endian,
}

impl TiffWriter {
  fn new(endian: Endian, size: usize) -> Self {
    Self {
      buf: vec![0; size],
      endian,
    }
  }

  fn into_inner(self) -> Vec<u8> {
    self.buf
  }

  fn write_header(&mut self, first_ifd: u32) -> Result<()> {
    let bom = if self.endian.little() { b"II" } else { b"MM" };
    self.buf[0..2].copy_from_slice(bom);
    self.endian.write_u16(&mut self.buf, 2, TIFF_MAGIC);
    self.endian.write_u32(&mut self.buf, 4, first_ifd);
    Ok(())
  }

  /// Write one directory with its record area at `front` and its spilled
  /// payloads from `back` on. Nested directories are placed whole (their
  /// own front plus back) inside this directory's back region.
  fn write_ifd(&mut self, ifd: &IFD, front: usize, back: usize, next_ifd: u32) -> Result<()> {
    let endian = self.endian;
    let mut record = front;
    let mut back_ptr = back;

    endian.write_u16(&mut self.buf, record, ifd.entry_count());
    record += 2;

    for entry in &ifd.entries {
      endian.write_u16(&mut self.buf, record, entry.tag);
      endian.write_u16(&mut self.buf, record + 2, entry.value_type());
      match &entry.value {
        Value::Ifd(sub) => {
          let layout = plan_ifd(sub);
          endian.write_u32(&mut self.buf, record + 4, 1);
          endian.write_u32(&mut self.buf, record + 8, back_ptr as u32);
          self.write_ifd(sub, back_ptr, back_ptr + layout.front, 0)?;
          back_ptr += layout.total();
        }
        value => {
          endian.write_u32(&mut self.buf, record + 4, entry.count());
          let size = value.byte_size();
          if size <= 4 {
            // payload left-aligned in the value field, remainder stays
            // zero so the round trip is byte exact
            self.write_value(value, record + 8)?;
          } else {
            endian.write_u32(&mut self.buf, record + 8, back_ptr as u32);
            self.write_value(value, back_ptr)?;
            back_ptr += size;
          }
        }
      }
      record += 12;
    }

    endian.write_u32(&mut self.buf, record, next_ifd);
    Ok(())
  }

  fn write_value(&mut self, value: &Value, offset: usize) -> Result<()> {
    let endian = self.endian;
    match value {
      Value::Byte(val) | Value::Undefined(val) => {
        self.buf[offset..offset + val.len()].copy_from_slice(val);
      }
      Value::Ascii(val) => {
        if val.has_interior_nul() {
          return Err(TiffError::InvalidInput("ASCII value contains interior NUL".into()));
        }
        let bytes = val.as_vec_with_nul();
        self.buf[offset..offset + bytes.len()].copy_from_slice(&bytes);
      }
      Value::Short(val) => {
        for (i, x) in val.iter().enumerate() {
          endian.write_u16(&mut self.buf, offset + i * 2, *x);
        }
      }
      Value::Long(val) => {
        for (i, x) in val.iter().enumerate() {
          endian.write_u32(&mut self.buf, offset + i * 4, *x);
        }
      }
      Value::Rational(val) => {
        for (i, x) in val.iter().enumerate() {
          endian.write_u32(&mut self.buf, offset + i * 8, x.n);
          endian.write_u32(&mut self.buf, offset + i * 8 + 4, x.d);
        }
      }
      Value::SByte(val) => {
        for (i, x) in val.iter().enumerate() {
          endian.write_i8(&mut self.buf, offset + i, *x);
        }
      }
      Value::SShort(val) => {
        for (i, x) in val.iter().enumerate() {
          endian.write_i16(&mut self.buf, offset + i * 2, *x);
        }
      }
      Value::SLong(val) => {
        for (i, x) in val.iter().enumerate() {
          endian.write_i32(&mut self.buf, offset + i * 4, *x);
        }
      }
      Value::SRational(val) => {
        for (i, x) in val.iter().enumerate() {
          endian.write_i32(&mut self.buf, offset + i * 8, x.n);
          endian.write_i32(&mut self.buf, offset + i * 8 + 4, x.d);
        }
      }
      Value::Float(val) => {
        for (i, x) in val.iter().enumerate() {
          endian.write_f32(&mut self.buf, offset + i * 4, *x);
        }
      }
      Value::Double(val) => {
        for (i, x) in val.iter().enumerate() {
          endian.write_f64(&mut self.buf, offset + i * 8, *x);
        }
      }
      Value::Ifd(_) => unreachable!("sub-IFDs are written by write_ifd"),
    }
    Ok(())
  }
}
