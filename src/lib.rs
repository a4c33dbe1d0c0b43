// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

//! Library for round-trippable reading and writing of image container
//! metadata: JPEG segment streams, PNG chunk streams, and the TIFF/Exif
//! directory trees embedded in them. Decoding a supported file and encoding
//! the result reproduces the original bytes; targeted edits (Exif fields,
//! PNG text chunks) produce files other tools accept.
//!
//! # Example
//! ```rust,no_run
//! use metaler::{decode_jpg_exif, update_jpg_exif, Exif, Jfif};
//!
//! fn main() {
//!   let bytes = std::fs::read("photo.jpg").unwrap();
//!   let mut jpg = Jfif::decode(&bytes).unwrap();
//!
//!   let mut exif = decode_jpg_exif(&jpg).unwrap();
//!   exif.user_comment = Some("Shot on a rainy day".into());
//!   update_jpg_exif(&mut jpg, &exif).unwrap();
//!
//!   std::fs::write("photo.jpg", jpg.encode()).unwrap();
//! }
//! ```

#![forbid(unsafe_code)]

pub mod bits;
pub mod exif;
pub mod formats;
pub mod tags;

pub use bits::Endian;
pub use exif::{decode_jpg_exif, update_jpg_exif, Exif, ExifError};
pub use formats::jfif::{is_jfif, Jfif, JfifError, Segment};
pub use formats::png::{is_png, Chunk, Png, PngError};
pub use formats::tiff::{decode_ifd, Rational, SRational, TiffAscii, TiffError, TiffFile, Value, IFD};
