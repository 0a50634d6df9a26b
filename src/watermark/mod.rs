// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Dual-entropy watermark encoder and detector.
//!
//! Embeds a self-describing, key-derived fingerprint into text (via
//! zero-width code points) or into the LSB plane of raw 8-bit image
//! samples, and later scores a document for presence of that mark.
//! Every fingerprint bit is `content_bit XOR state_bit`: the content
//! bit is deterministic from content + position, the state bit comes
//! from a stream keyed by `state_seed ^ hash(key)`. Layered bottom-up:
//!
//! - [`hashing`]: stable FNV-1a / Murmur-finalizer hashes and the keyed
//!   state-bit stream (all wire format).
//! - [`zero_width`]: the invisible bit alphabet and MSB-first packing.
//! - [`metadata`]: the fixed 24-byte self-describing header.
//! - [`text`] / [`image`]: the two embedding surfaces.
//!
//! Detection is a pure scoring pass: it returns a [`Detection`] for any
//! input and never raises. Only image embedding can fail (geometry).

pub mod error;
pub mod hashing;
pub mod image;
pub mod metadata;
pub mod text;
pub mod zero_width;

pub use error::WatermarkError;
pub use image::{ImageEmbed, ImagePayload};
pub use metadata::Metadata;
pub use text::TextEmbed;
pub use zero_width::strip_zero_width;

use crate::det_math::det_erfc;

/// Outcome of scoring a payload for a watermark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Fraction of compared bits that matched.
    pub score: f64,
    /// One-tailed probability that an unwatermarked payload matches at
    /// least this well by chance.
    pub false_positive_rate: f64,
    /// Number of bits compared: min(expected, extracted).
    pub total_bits: usize,
    /// Number of compared bits that matched.
    pub matching_bits: usize,
    /// Whether a well-formed, version-compatible header was found.
    pub metadata_valid: bool,
}

impl Detection {
    /// The no-watermark result: nothing parsed, nothing compared.
    pub(crate) fn invalid() -> Self {
        Self {
            score: 0.0,
            false_positive_rate: 1.0,
            total_bits: 0,
            matching_bits: 0,
            metadata_valid: false,
        }
    }
}

/// Compare expected against extracted bits and score the overlap.
///
/// The false-positive rate is the upper normal tail of
/// Binomial(total, ½): `0.5 · erfc(z / √2)` with
/// `z = (matching − total/2) / √(total/4 + 1e-9)`. Zero comparable
/// bits score 0 with a false-positive rate of 1.
pub(crate) fn score_detection(expected: &[u8], extracted: &[u8], metadata_valid: bool) -> Detection {
    let total_bits = expected.len().min(extracted.len());
    let matching_bits = expected
        .iter()
        .zip(extracted.iter())
        .filter(|(e, x)| e == x)
        .count();

    if total_bits == 0 {
        return Detection {
            score: 0.0,
            false_positive_rate: 1.0,
            total_bits: 0,
            matching_bits: 0,
            metadata_valid,
        };
    }

    let total = total_bits as f64;
    let z = (matching_bits as f64 - total / 2.0) / (total / 4.0 + 1e-9).sqrt();
    Detection {
        score: matching_bits as f64 / total,
        false_positive_rate: 0.5 * det_erfc(z / std::f64::consts::SQRT_2),
        total_bits,
        matching_bits,
        metadata_valid,
    }
}
