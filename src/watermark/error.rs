// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Error types for the watermark engine.
//!
//! Only *embedding* raises errors (bad image geometry). Detection runs
//! on arbitrary payloads and therefore never fails: a payload with no
//! recognisable watermark comes back as a [`Detection`]
//! (`metadata_valid = false`, score 0, false-positive rate 1.0).
//!
//! [`Detection`]: crate::watermark::Detection

use core::fmt;

/// Errors that can occur while embedding a watermark.
#[derive(Debug, PartialEq, Eq)]
pub enum WatermarkError {
    /// The image has zero samples.
    EmptyImage,
    /// The sample buffer length does not match height × width × channels.
    GeometryMismatch,
    /// The image has too few samples to hold the metadata region.
    ImageTooSmall,
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyImage => write!(f, "image payload is empty"),
            Self::GeometryMismatch => {
                write!(f, "sample buffer does not match height x width x channels")
            }
            Self::ImageTooSmall => write!(f, "image too small for metadata encoding"),
        }
    }
}

impl std::error::Error for WatermarkError {}
