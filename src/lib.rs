// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! # veil-core
//!
//! Pure-Rust privacy engine with two independent cores:
//!
//! - **Masked aggregation** (`aggregation` module): computes a secure
//!   sum, mean and variance of private metric vectors contributed by N
//!   clients, tolerating the dropout of up to N − t clients. Built on
//!   Shamir secret sharing over the Mersenne prime 2^61 − 1 and
//!   antisymmetric pairwise masks that cancel exactly under partial
//!   participation. Honest-but-curious threat model.
//!
//! - **Dual-entropy watermarking** (`watermark` module): embeds a
//!   self-describing, key-derived fingerprint into text (zero-width
//!   code points) or into the LSB plane of raw 8-bit image samples,
//!   and scores documents for presence of the mark with a calibrated
//!   false-positive rate.
//!
//! Both cores are synchronous, single-threaded libraries with no I/O,
//! no logging and no on-disk state. All wire-format constants (field
//! modulus, hash constants, zero-width alphabet, header layout) are
//! pinned by `tests/wire_format.rs`.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use veil_core::{Coordinator, text_embed, text_detect};
//!
//! // Secure sum of three private scalars, one client dropping out.
//! let mut agg = Coordinator::new(3, 2, 1).unwrap();
//! for (id, v) in [1.0, 2.0, 3.0].iter().enumerate() {
//!     agg.register_client(id, &[*v]).unwrap();
//! }
//! let result = agg.finalize(&[0, 1]).unwrap();
//! assert!((result.sum[0] - 6.0).abs() < 1e-6);
//!
//! // Watermark a sentence and verify it.
//! let marked = text_embed("attack at dawn", "shared-key", 42);
//! assert_eq!(text_detect(&marked.watermarked).score, 1.0);
//! ```

pub mod aggregation;
pub mod det_math;
pub mod watermark;

pub use aggregation::{
    AggregationError, AggregationResult, Coordinator, Shamir, Share, DEFAULT_SCALE,
};
pub use watermark::image::{detect as image_detect, embed as image_embed};
pub use watermark::text::{detect as text_detect, embed as text_embed};
pub use watermark::{
    strip_zero_width, Detection, ImageEmbed, ImagePayload, Metadata, TextEmbed, WatermarkError,
};
