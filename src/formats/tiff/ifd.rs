// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

use serde::{Deserialize, Serialize};

use super::entry::Entry;
use super::value::Value;

/// Image File Directory: an ordered list of tagged entries.
///
/// Entries keep their on-wire order, duplicates included. The TIFF
/// specification asks for ascending tag order inside a directory; this
/// library does not enforce it and leaves the ordering to the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IFD {
  pub entries: Vec<Entry>,
}

impl IFD {
  pub fn new(entries: Vec<Entry>) -> Self {
    Self { entries }
  }

  pub fn entry_count(&self) -> u16 {
    self.entries.len() as u16
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Append an entry, keeping whatever order the caller builds.
  pub fn push<T: Into<u16>>(&mut self, tag: T, value: Value) {
    self.entries.push(Entry::new(tag.into(), value));
  }

  /// First entry with this tag, in on-wire order.
  pub fn get_entry<T: Into<u16>>(&self, tag: T) -> Option<&Entry> {
    let tag = tag.into();
    self.entries.iter().find(|e| e.tag == tag)
  }

  pub fn get_entry_mut<T: Into<u16>>(&mut self, tag: T) -> Option<&mut Entry> {
    let tag = tag.into();
    self.entries.iter_mut().find(|e| e.tag == tag)
  }

  pub fn has_entry<T: Into<u16>>(&self, tag: T) -> bool {
    self.get_entry(tag).is_some()
  }

  /// Resolved sub-directory behind a pointer tag, if present.
  pub fn sub_ifd<T: Into<u16>>(&self, tag: T) -> Option<&IFD> {
    self.get_entry(tag).and_then(|e| e.value.sub_ifd())
  }

  pub fn dump(&self, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    out.push(format!("IFD entries: {}\n", self.entries.len()));
    out.push(format!("{0:<10} | {1:<10} | {2:<6} | {3}\n", "Tag", "Type", "Count", "Data"));
    for entry in &self.entries {
      out.push(format!(
        "{0:#06x} | {1:<10} | {2:<6} | {3}",
        entry.tag,
        entry.type_name(),
        entry.count(),
        entry.value.visual_rep(limit)
      ));
      if let Value::Ifd(sub) = &entry.value {
        for line in sub.dump(limit) {
          out.push(format!("   {}", line));
        }
      }
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::formats::tiff::value::TiffAscii;

  #[test]
  fn lookup_returns_first_match() {
    let mut ifd = IFD::default();
    ifd.push(0x0131u16, Value::Ascii(TiffAscii::new("one")));
    ifd.push(0x0131u16, Value::Ascii(TiffAscii::new("two")));
    assert_eq!(ifd.get_entry(0x0131u16).unwrap().value.as_string(), Some("one"));
    assert_eq!(ifd.entry_count(), 2);
  }

  #[test]
  fn sub_ifd_lookup() {
    let mut sub = IFD::default();
    sub.push(0x9000u16, Value::Undefined(b"0230".to_vec()));
    let mut ifd = IFD::default();
    ifd.push(0x8769u16, Value::Ifd(sub));
    assert!(ifd.sub_ifd(0x8769u16).is_some());
    assert!(ifd.sub_ifd(0x8825u16).is_none());
    assert!(!ifd.dump(8).is_empty());
  }
}
