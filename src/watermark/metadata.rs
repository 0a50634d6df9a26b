// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Self-describing watermark metadata header.
//!
//! Both watermark variants carry the same fixed 24-byte header:
//!
//! ```text
//! [4 bytes ] version            (big-endian u32, currently 1)
//! [8 bytes ] state_seed         (big-endian u64)
//! [8 bytes ] key_hash           (big-endian u64, FNV-1a of the key)
//! [4 bytes ] fingerprint_length (big-endian u32)
//! ```
//!
//! Bits within a byte are MSB-first. In text the 192 header bits travel
//! as a sentinel-framed zero-width run prepended to the payload; in
//! images each bit is repeated across 4 consecutive sample LSBs and
//! majority-voted on extraction.

use crate::watermark::zero_width::{self, bits_to_bytes, bytes_to_bits};

/// Header size in bytes.
pub const METADATA_BYTES: usize = 24;
/// Header size in bits.
pub const METADATA_BITS: usize = METADATA_BYTES * 8;
/// Per-bit repetition factor in the image LSB plane.
pub const METADATA_REPEAT: usize = 4;
/// Image samples consumed by the repeated header: 24·8·4.
pub const METADATA_SLOTS: usize = METADATA_BITS * METADATA_REPEAT;

/// The only version this engine writes or accepts.
pub const VERSION: u32 = 1;

/// Decoded watermark header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// Format version; detection rejects anything but [`VERSION`].
    pub version: u32,
    /// Caller-chosen seed for the state-bit stream.
    pub state_seed: u64,
    /// FNV-1a hash of the embedding key.
    pub key_hash: u64,
    /// Number of fingerprint bits that follow the header.
    pub fingerprint_length: u32,
}

impl Metadata {
    /// Serialize to the fixed 24-byte big-endian layout.
    pub fn pack(&self) -> [u8; METADATA_BYTES] {
        let mut bytes = [0u8; METADATA_BYTES];
        bytes[0..4].copy_from_slice(&self.version.to_be_bytes());
        bytes[4..12].copy_from_slice(&self.state_seed.to_be_bytes());
        bytes[12..20].copy_from_slice(&self.key_hash.to_be_bytes());
        bytes[20..24].copy_from_slice(&self.fingerprint_length.to_be_bytes());
        bytes
    }

    /// Parse the fixed layout; `None` unless exactly 24 bytes.
    pub fn unpack(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != METADATA_BYTES {
            return None;
        }
        Some(Self {
            version: u32::from_be_bytes(bytes[0..4].try_into().ok()?),
            state_seed: u64::from_be_bytes(bytes[4..12].try_into().ok()?),
            key_hash: u64::from_be_bytes(bytes[12..20].try_into().ok()?),
            fingerprint_length: u32::from_be_bytes(bytes[20..24].try_into().ok()?),
        })
    }

    /// Header as a sentinel-framed zero-width run (192 bits MSB-first).
    pub fn encode_zero_width(&self) -> String {
        zero_width::encode_bits(&bytes_to_bits(&self.pack()), true)
    }

    /// Parse a sentinel-framed header from the start of `text`.
    ///
    /// Returns the header and the byte offset of the first character
    /// after the end sentinel. `None` if the frame is absent or does
    /// not hold exactly 192 bits.
    pub fn decode_zero_width(text: &str) -> Option<(Self, usize)> {
        let (bits, consumed) = zero_width::decode_bits(text, true);
        if bits.len() != METADATA_BITS {
            return None;
        }
        let meta = Self::unpack(&bits_to_bytes(&bits))?;
        Some((meta, consumed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Metadata {
        Metadata {
            version: VERSION,
            state_seed: 0x0123_4567_89AB_CDEF,
            key_hash: 0xFEDC_BA98_7654_3210,
            fingerprint_length: 1337,
        }
    }

    #[test]
    fn pack_layout_is_big_endian() {
        let bytes = sample().pack();
        assert_eq!(&bytes[0..4], &[0, 0, 0, 1]);
        assert_eq!(&bytes[4..12], &[0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF]);
        assert_eq!(&bytes[12..20], &[0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54, 0x32, 0x10]);
        assert_eq!(&bytes[20..24], &[0, 0, 0x05, 0x39]); // 1337
    }

    #[test]
    fn pack_unpack_roundtrip() {
        let meta = sample();
        assert_eq!(Metadata::unpack(&meta.pack()), Some(meta));
    }

    #[test]
    fn unpack_rejects_wrong_length() {
        assert_eq!(Metadata::unpack(&[0u8; 23]), None);
        assert_eq!(Metadata::unpack(&[0u8; 25]), None);
        assert_eq!(Metadata::unpack(&[]), None);
    }

    #[test]
    fn zero_width_roundtrip() {
        let meta = sample();
        let framed = meta.encode_zero_width();
        let (decoded, consumed) = Metadata::decode_zero_width(&framed).unwrap();
        assert_eq!(decoded, meta);
        assert_eq!(consumed, framed.len());
    }

    #[test]
    fn zero_width_frame_carries_194_code_points() {
        // start sentinel + 192 bits + end sentinel, 3 UTF-8 bytes each
        let framed = sample().encode_zero_width();
        assert_eq!(framed.chars().count(), METADATA_BITS + 2);
        assert_eq!(framed.len(), (METADATA_BITS + 2) * 3);
    }

    #[test]
    fn truncated_frame_is_invalid() {
        let framed = sample().encode_zero_width();
        // drop the last bit carrier + end sentinel (6 bytes)
        let truncated = &framed[..framed.len() - 6];
        assert!(Metadata::decode_zero_width(truncated).is_none());
    }

    #[test]
    fn missing_start_sentinel_is_invalid() {
        let framed = sample().encode_zero_width();
        assert!(Metadata::decode_zero_width(&framed[3..]).is_none());
    }
}
