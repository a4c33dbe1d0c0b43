// SPDX-License-Identifier: MIT
// Copyright 2022 The metaler developers

pub mod jfif;
pub mod png;
pub mod tiff;
