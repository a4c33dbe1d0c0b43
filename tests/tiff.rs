// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

mod common;

use common::exif_payload_without_known_tags;
use metaler::{decode_ifd, Endian, Rational, SRational, TiffAscii, TiffFile, Value, IFD};

fn sample_tree(endian: Endian) -> TiffFile {
  let mut sub = IFD::default();
  sub.push(0x9000u16, Value::Undefined(b"0230".to_vec()));
  sub.push(0x9201u16, Value::SRational(vec![SRational::new(-7, 1)]));

  let mut ifd0 = IFD::default();
  ifd0.push(0x010Fu16, Value::Ascii(TiffAscii::new("Examplecorp")));
  ifd0.push(0x0112u16, Value::Short(vec![1]));
  ifd0.push(0x011Au16, Value::Rational(vec![Rational::new(300, 1)]));
  ifd0.push(0x8769u16, Value::Ifd(sub));
  ifd0.push(0xC62Fu16, Value::Double(vec![2.5, -0.125]));

  let mut ifd1 = IFD::default();
  ifd1.push(0x0100u16, Value::Long(vec![160]));
  ifd1.push(0x0101u16, Value::Long(vec![120]));

  TiffFile::new(endian, vec![ifd0, ifd1])
}

#[test]
fn structural_equivalence_little_endian() {
  common::init_logger();
  let file = sample_tree(Endian::Little);
  let back = TiffFile::decode(&file.encode().unwrap()).unwrap();
  assert_eq!(back, file);
}

#[test]
fn structural_equivalence_big_endian() {
  let file = sample_tree(Endian::Big);
  let bytes = file.encode().unwrap();
  assert_eq!(&bytes[0..2], b"MM");
  let back = TiffFile::decode(&bytes).unwrap();
  assert_eq!(back.endian, Endian::Big);
  assert_eq!(back, file);
}

#[test]
fn double_encoding_roundtrip_is_stable() {
  // a second pass over re-encoded bytes must not drift
  let first = sample_tree(Endian::Little).encode().unwrap();
  let second = TiffFile::decode(&first).unwrap().encode().unwrap();
  assert_eq!(first, second);
}

#[test]
fn decode_ifd_resolves_sub_directories() {
  let file = sample_tree(Endian::Little);
  let bytes = file.encode().unwrap();
  // IFD0 sits at the fixed offset 8
  let ifd0 = decode_ifd(&bytes, 8, Endian::Little).unwrap();
  assert_eq!(ifd0.entry_count(), 5);
  let sub = ifd0.sub_ifd(0x8769u16).expect("resolved sub-IFD");
  assert_eq!(sub.entry_count(), 2);
}

#[test]
fn exif_framed_tiff_decodes_standalone() {
  let payload = exif_payload_without_known_tags();
  let tiff = TiffFile::decode(&payload[8..]).unwrap();
  assert_eq!(tiff.chain.len(), 1);
  assert!(tiff.root_ifd().unwrap().has_entry(0x0112u16));
}
