// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

//! Synthetic in-memory fixtures shared by the integration tests.

#![allow(dead_code)]

use metaler::{Chunk, Endian, Png, TiffFile, Value, IFD};

pub fn init_logger() {
  _ = env_logger::builder().is_test(true).try_init();
}

/// Framed Exif APP1 payload whose TIFF carries only an Orientation entry,
/// so the projected record is empty.
pub fn exif_payload_without_known_tags() -> Vec<u8> {
  let mut ifd0 = IFD::default();
  ifd0.push(0x0112u16, Value::Short(vec![1]));
  let tiff = TiffFile::new(Endian::Little, vec![ifd0]).encode().expect("encode tiff");
  let size = (8 + tiff.len()) as u16;
  let mut payload = Vec::new();
  payload.extend_from_slice(&size.to_be_bytes());
  payload.extend_from_slice(b"Exif\0\0");
  payload.extend_from_slice(&tiff);
  payload
}

/// A minimal JPEG with an Exif APP1 segment but no projected fields,
/// the shape of a camera file whose maker wrote no comment.
pub fn jpeg_with_empty_exif() -> Vec<u8> {
  let mut buf = Vec::new();
  buf.extend_from_slice(&[0xFF, 0xD8]); // SOI
  buf.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]); // APP0 JFIF
  buf.extend_from_slice(b"JFIF\0");
  buf.extend_from_slice(&[0x01, 0x02, 0x00, 0x00, 0x48, 0x00, 0x48, 0x00, 0x00]);
  let app1 = exif_payload_without_known_tags();
  buf.extend_from_slice(&[0xFF, 0xE1]);
  buf.extend_from_slice(&app1);
  buf.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x05, 0x00, 0x11, 0x22]); // DQT stub
  buf.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]); // SOS
  buf.extend_from_slice(&[0x1A, 0xFF, 0x00, 0x2B, 0xFF, 0xD0, 0x3C, 0xFF, 0x00, 0x4D]); // scan
  buf.extend_from_slice(&[0xFF, 0xD9]); // EOI
  buf
}

/// A minimal JPEG without any APP1 segment.
pub fn jpeg_without_app1() -> Vec<u8> {
  let mut buf = Vec::new();
  buf.extend_from_slice(&[0xFF, 0xD8]);
  buf.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
  buf.extend_from_slice(b"JFIF\0");
  buf.extend_from_slice(&[0x01, 0x02, 0x00, 0x00, 0x48, 0x00, 0x48, 0x00, 0x00]);
  buf.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
  buf.extend_from_slice(&[0x51, 0x62, 0xFF, 0x00, 0x73]);
  buf.extend_from_slice(&[0xFF, 0xD9]);
  buf
}

/// A minimal PNG: IHDR for a 1x1 grayscale image, one IDAT, IEND.
pub fn minimal_png() -> Png {
  Png {
    chunks: vec![
      Chunk::new(*b"IHDR", vec![0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]),
      Chunk::new(*b"IDAT", vec![0x78, 0x9C, 0x62, 0x62, 0x00, 0x00, 0x00, 0x06, 0x00, 0x03]),
      Chunk::new(*b"IEND", Vec::new()),
    ],
  }
}

/// A PNG already carrying Author and Software text chunks.
pub fn png_with_text_chunks() -> Vec<u8> {
  let mut png = minimal_png();
  png.set_text("Author", "Project Nayuki");
  png.set_text("Software", "Hex editor");
  png.encode()
}
