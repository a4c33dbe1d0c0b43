// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

//! Well-known TIFF and Exif tag ids.
//!
//! Lookup helpers accept anything convertible to a raw `u16`, so callers can
//! mix these enums with private tag numbers.

/// Tags defined for the root (IFD0) directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TiffCommonTag {
  ImageWidth = 0x0100,
  ImageLength = 0x0101,
  BitsPerSample = 0x0102,
  Compression = 0x0103,
  ImageDescription = 0x010E,
  Make = 0x010F,
  Model = 0x0110,
  Orientation = 0x0112,
  XResolution = 0x011A,
  YResolution = 0x011B,
  ResolutionUnit = 0x0128,
  Software = 0x0131,
  DateTime = 0x0132,
  Artist = 0x013B,
  Copyright = 0x8298,
  ExifIFDPointer = 0x8769,
}

impl From<TiffCommonTag> for u16 {
  fn from(tag: TiffCommonTag) -> u16 {
    tag as u16
  }
}

/// Tags defined for the Exif sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ExifTag {
  ExposureTime = 0x829A,
  FNumber = 0x829D,
  ExifVersion = 0x9000,
  DateTimeOriginal = 0x9003,
  CreateDate = 0x9004,
  ShutterSpeedValue = 0x9201,
  ApertureValue = 0x9202,
  UserComment = 0x9286,
  FlashpixVersion = 0xA000,
  ColorSpace = 0xA001,
}

impl From<ExifTag> for u16 {
  fn from(tag: ExifTag) -> u16 {
    tag as u16
  }
}

/// Tags whose LONG value is an absolute offset to a nested directory.
///
/// Only the Exif pointer is wired today; GPS (0x8825) and Interop (0xA005)
/// follow the same convention and would slot in here.
pub const SUB_IFD_TAGS: [u16; 1] = [TiffCommonTag::ExifIFDPointer as u16];

/// True when `tag` references a nested sub-directory.
#[inline]
pub fn is_sub_ifd_tag(tag: u16) -> bool {
  SUB_IFD_TAGS.contains(&tag)
}
