// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

//! Core geometry for locating eggs in segmented ovary images and for
//! extracting canonically oriented object crops.
//!
//! The crate is organised in the following modules:
//!
//! * `cv` - rasterization, overlap, moments, background inference and warping
//! * `im` - image, label mask and binary mask containers
//! * `io` - delimited/parquet tables and numpy arrays
//! * `mt` - egg annotations and ellipse candidate matching
//! * `ut` - paths, progress reporting and worker pools

pub mod constant;
pub mod cv;
pub mod error;
pub mod im;
pub mod io;
pub mod mt;
pub mod ut;
