// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

mod common;

use common::{jpeg_with_empty_exif, jpeg_without_app1};
use metaler::{decode_jpg_exif, update_jpg_exif, Exif, Jfif};

#[test]
fn roundtrip_is_byte_exact() {
  common::init_logger();
  for bytes in [jpeg_with_empty_exif(), jpeg_without_app1()] {
    let jpg = Jfif::decode(&bytes).expect("decode");
    assert_eq!(jpg.encode(), bytes);
  }
}

#[test]
fn jpeg_without_known_exif_tags_reads_empty_record() {
  let jpg = Jfif::decode(&jpeg_with_empty_exif()).unwrap();
  let exif = decode_jpg_exif(&jpg).unwrap();
  assert!(exif.is_empty());
}

#[test]
fn user_comment_update_and_readback() {
  let mut jpg = Jfif::decode(&jpeg_with_empty_exif()).unwrap();

  let mut exif = Exif::default();
  exif.user_comment = Some("Test 123!".into());
  update_jpg_exif(&mut jpg, &exif).unwrap();
  assert_eq!(decode_jpg_exif(&jpg).unwrap().user_comment.as_deref(), Some("Test 123!"));

  // a second update replaces the value instead of stacking segments
  exif.user_comment = Some("Test 1234!".into());
  update_jpg_exif(&mut jpg, &exif).unwrap();
  assert_eq!(decode_jpg_exif(&jpg).unwrap().user_comment.as_deref(), Some("Test 1234!"));

  // the comment survives reassembly of the whole stream
  let reparsed = Jfif::decode(&jpg.encode()).unwrap();
  assert_eq!(decode_jpg_exif(&reparsed).unwrap().user_comment.as_deref(), Some("Test 1234!"));
}

#[test]
fn full_record_roundtrips_through_jpeg() {
  let mut jpg = Jfif::decode(&jpeg_with_empty_exif()).unwrap();
  let exif = Exif {
    exif_version: Some("0230".into()),
    date_time_original: Some("2022:07:09 12:00:00".into()),
    user_comment: Some("Test 123!".into()),
  };
  update_jpg_exif(&mut jpg, &exif).unwrap();
  assert_eq!(decode_jpg_exif(&jpg).unwrap(), exif);
}

#[test]
fn update_without_app1_is_a_noop() {
  let bytes = jpeg_without_app1();
  let mut jpg = Jfif::decode(&bytes).unwrap();
  let mut exif = Exif::default();
  exif.user_comment = Some("Test 123!".into());
  update_jpg_exif(&mut jpg, &exif).unwrap();
  assert_eq!(jpg.encode(), bytes);
  assert!(decode_jpg_exif(&jpg).unwrap().is_empty());
}
