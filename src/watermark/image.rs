// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Image watermarking in the LSB plane of raw 8-bit samples.
//!
//! The first 768 samples carry the 192-bit metadata header with each
//! bit repeated across 4 consecutive LSBs; extraction majority-votes
//! each group (tie counts as 0), so a single flipped sample per group
//! is harmless. Every sample after the metadata region carries one
//! fingerprint bit: `content_bit(sample, index) XOR state_bit`.
//!
//! The content bit hashes the sample byte with its LSB masked out, so
//! writing the fingerprint into the LSB does not disturb the value the
//! detector recomputes from the watermarked image. Embedding never
//! changes the buffer length and never touches anything above the LSB
//! plane. Pixel-exact preservation is assumed; re-encoding or geometric
//! transforms destroy the mark.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::watermark::error::WatermarkError;
use crate::watermark::hashing::{stable_hash64, StateBits};
use crate::watermark::metadata::{
    Metadata, METADATA_BITS, METADATA_REPEAT, METADATA_SLOTS, VERSION,
};
use crate::watermark::zero_width::{bits_to_bytes, bytes_to_bits};
use crate::watermark::{score_detection, Detection};

/// Raw 8-bit image samples in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// height × width × channels sample bytes.
    pub bytes: Vec<u8>,
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl ImagePayload {
    /// Wrap a sample buffer, validating its geometry.
    pub fn new(
        height: usize,
        width: usize,
        channels: usize,
        bytes: Vec<u8>,
    ) -> Result<Self, WatermarkError> {
        let total = height
            .checked_mul(width)
            .and_then(|p| p.checked_mul(channels))
            .ok_or(WatermarkError::GeometryMismatch)?;
        if total == 0 {
            return Err(WatermarkError::EmptyImage);
        }
        if bytes.len() != total {
            return Err(WatermarkError::GeometryMismatch);
        }
        Ok(Self {
            bytes,
            height,
            width,
            channels,
        })
    }

    /// Single-channel convenience for 2-D sample grids.
    pub fn grayscale(height: usize, width: usize, bytes: Vec<u8>) -> Result<Self, WatermarkError> {
        Self::new(height, width, 1, bytes)
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the image holds no samples (unreachable via `new`).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of embedding an image watermark.
#[derive(Debug, Clone)]
pub struct ImageEmbed {
    /// The watermarked image; same geometry, only LSBs changed.
    pub watermarked: ImagePayload,
    /// The fingerprint bits written after the metadata region.
    pub fingerprint: Vec<u8>,
    /// The header that was embedded.
    pub metadata: Metadata,
}

/// Content bit for one sample: the byte enters the hash with its LSB
/// masked out, making the bit invariant under LSB embedding.
#[inline]
fn content_bit(byte: u8, index: usize) -> u8 {
    (stable_hash64((((byte & 0xFE) as u64) << 32) ^ index as u64) & 1) as u8
}

/// Fingerprint bits for every sample at index ≥ `METADATA_SLOTS`.
fn combined_bits(samples: &[u8], state_seed: u64, key_hash: u64) -> Vec<u8> {
    let body = &samples[METADATA_SLOTS.min(samples.len())..];

    #[cfg(feature = "parallel")]
    let content: Vec<u8> = body
        .par_iter()
        .enumerate()
        .map(|(i, &byte)| content_bit(byte, METADATA_SLOTS + i))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let content: Vec<u8> = body
        .iter()
        .enumerate()
        .map(|(i, &byte)| content_bit(byte, METADATA_SLOTS + i))
        .collect();

    // The state stream is inherently sequential; XOR it in afterwards.
    let mut stream = StateBits::new(state_seed, key_hash);
    content.into_iter().map(|bit| bit ^ stream.next_bit()).collect()
}

/// Write the header into the metadata region, 4 LSBs per bit.
fn inject_metadata(samples: &mut [u8], metadata: &Metadata) {
    let bits = bytes_to_bits(&metadata.pack());
    for (bit_index, &bit) in bits.iter().enumerate() {
        for rep in 0..METADATA_REPEAT {
            let slot = bit_index * METADATA_REPEAT + rep;
            samples[slot] = (samples[slot] & 0xFE) | bit;
        }
    }
}

/// Majority-vote the header back out of the metadata region.
fn extract_metadata(samples: &[u8]) -> Option<Metadata> {
    if samples.len() < METADATA_SLOTS {
        return None;
    }
    let mut voted = Vec::with_capacity(METADATA_BITS);
    for bit_index in 0..METADATA_BITS {
        let start = bit_index * METADATA_REPEAT;
        let ones: usize = samples[start..start + METADATA_REPEAT]
            .iter()
            .map(|&s| (s & 1) as usize)
            .sum();
        // strict majority; a 2:2 tie decodes as 0
        voted.push(u8::from(ones > METADATA_REPEAT / 2));
    }
    Metadata::unpack(&bits_to_bytes(&voted))
}

/// Embed a watermark into `payload`.
///
/// # Errors
/// [`WatermarkError::ImageTooSmall`] unless the image has more samples
/// than the 768-slot metadata region.
pub fn embed(
    payload: &ImagePayload,
    key: &str,
    state_seed: u64,
) -> Result<ImageEmbed, WatermarkError> {
    let total = payload.len();
    if total <= METADATA_SLOTS {
        return Err(WatermarkError::ImageTooSmall);
    }

    let metadata = Metadata {
        version: VERSION,
        state_seed,
        key_hash: crate::watermark::hashing::stable_hash(key),
        fingerprint_length: (total - METADATA_SLOTS) as u32,
    };
    let fingerprint = combined_bits(&payload.bytes, metadata.state_seed, metadata.key_hash);

    let mut watermarked = payload.clone();
    inject_metadata(&mut watermarked.bytes, &metadata);
    for (i, &bit) in fingerprint.iter().enumerate() {
        let sample = &mut watermarked.bytes[METADATA_SLOTS + i];
        *sample = (*sample & 0xFE) | bit;
    }

    Ok(ImageEmbed {
        watermarked,
        fingerprint,
        metadata,
    })
}

/// Score `payload` for the presence of a watermark.
///
/// Never fails: an image without a parseable header (or with a foreign
/// version, or too small to hold one) reports `metadata_valid = false`.
/// A header whose declared fingerprint length exceeds the available
/// region is reported valid but with zero comparable bits.
pub fn detect(payload: &ImagePayload) -> Detection {
    let total = payload.len();
    if total <= METADATA_SLOTS {
        return Detection::invalid();
    }
    let metadata = match extract_metadata(&payload.bytes) {
        Some(meta) if meta.version == VERSION => meta,
        _ => return Detection::invalid(),
    };

    let declared = metadata.fingerprint_length as usize;
    if declared > total - METADATA_SLOTS {
        return score_detection(&[], &[], true);
    }

    let expected = combined_bits(&payload.bytes, metadata.state_seed, metadata.key_hash);
    let extracted: Vec<u8> = payload.bytes[METADATA_SLOTS..METADATA_SLOTS + declared]
        .iter()
        .map(|&s| s & 1)
        .collect();

    score_detection(&expected, &extracted, true)
}
