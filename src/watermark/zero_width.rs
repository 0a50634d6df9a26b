// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Zero-width code-point bit codec.
//!
//! Four invisible code points carry the watermark channel:
//!
//! | code point | meaning                  |
//! |------------|--------------------------|
//! | U+200B     | bit 0 (zero width space) |
//! | U+200C     | bit 1 (zero width non-joiner) |
//! | U+2063     | metadata start sentinel (invisible separator) |
//! | U+2064     | metadata end sentinel (invisible plus) |
//!
//! Also provides MSB-first bit/byte packing for the metadata header.

/// Bit 0 carrier.
pub const ZW_ZERO: char = '\u{200B}';
/// Bit 1 carrier.
pub const ZW_ONE: char = '\u{200C}';
/// Metadata start sentinel.
pub const ZW_META_START: char = '\u{2063}';
/// Metadata end sentinel.
pub const ZW_META_END: char = '\u{2064}';

/// True for any of the four carrier code points.
pub fn is_zero_width(c: char) -> bool {
    matches!(c, ZW_ZERO | ZW_ONE | ZW_META_START | ZW_META_END)
}

/// Encode bits as zero-width code points, optionally sentinel-framed.
pub fn encode_bits(bits: &[u8], with_sentinels: bool) -> String {
    let mut out = String::with_capacity((bits.len() + 2) * 3);
    if with_sentinels {
        out.push(ZW_META_START);
    }
    for &bit in bits {
        out.push(if bit & 1 == 1 { ZW_ONE } else { ZW_ZERO });
    }
    if with_sentinels {
        out.push(ZW_META_END);
    }
    out
}

/// Decode a zero-width bit run from the start of `text`.
///
/// Sentinel mode requires the start sentinel as the very first code
/// point, collects bits while skipping any other code point, and stops
/// after the end sentinel. Plain mode stops at the first non-bit code
/// point. Returns the bits and the byte offset of the first unconsumed
/// character.
pub fn decode_bits(text: &str, with_sentinels: bool) -> (Vec<u8>, usize) {
    let mut bits = Vec::new();
    let mut chars = text.char_indices();

    if with_sentinels {
        match chars.next() {
            Some((_, c)) if c == ZW_META_START => {}
            _ => return (bits, 0),
        }
    }

    let mut end = text.len();
    for (idx, c) in chars {
        match c {
            ZW_ZERO => bits.push(0),
            ZW_ONE => bits.push(1),
            ZW_META_END if with_sentinels => {
                end = idx + c.len_utf8();
                return (bits, end);
            }
            _ if with_sentinels => {} // skipped inside the frame
            _ => {
                end = idx;
                return (bits, end);
            }
        }
    }
    (bits, end)
}

/// Rebuild `text` with every zero-width carrier removed.
///
/// Everything else is preserved byte-for-byte; stripping twice is a
/// no-op.
pub fn strip_zero_width(text: &str) -> String {
    text.chars().filter(|&c| !is_zero_width(c)).collect()
}

/// Pack bytes into bits, MSB first within each byte.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_pos in (0..8).rev() {
            bits.push((byte >> bit_pos) & 1);
        }
    }
    bits
}

/// Pack bits (MSB first) back into bytes.
/// Pads the last byte with zero bits if `bits.len()` is not a multiple of 8.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((bits.len() + 7) / 8);
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            byte |= (bit & 1) << (7 - i);
        }
        bytes.push(byte);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_plain() {
        let bits = vec![1u8, 0, 0, 1, 1, 0];
        let encoded = encode_bits(&bits, false);
        let (decoded, consumed) = decode_bits(&encoded, false);
        assert_eq!(decoded, bits);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn plain_mode_stops_at_first_visible_char() {
        let mut text = encode_bits(&[1, 1, 0], false);
        text.push_str("visible");
        let (decoded, consumed) = decode_bits(&text, false);
        assert_eq!(decoded, vec![1, 1, 0]);
        assert_eq!(&text[consumed..], "visible");
    }

    #[test]
    fn sentinel_roundtrip() {
        let bits = vec![0u8, 1, 0, 1, 1, 1, 0, 0];
        let framed = encode_bits(&bits, true);
        let (decoded, consumed) = decode_bits(&framed, true);
        assert_eq!(decoded, bits);
        assert_eq!(consumed, framed.len());
    }

    #[test]
    fn sentinel_mode_requires_leading_start() {
        let framed = encode_bits(&[1, 0], true);
        let shifted = format!("x{framed}");
        let (decoded, consumed) = decode_bits(&shifted, true);
        assert!(decoded.is_empty());
        assert_eq!(consumed, 0);
    }

    #[test]
    fn sentinel_mode_skips_foreign_code_points() {
        let text = format!("{ZW_META_START}{ZW_ONE}?{ZW_ZERO}{ZW_META_END}rest");
        let (decoded, consumed) = decode_bits(&text, true);
        assert_eq!(decoded, vec![1, 0]);
        assert_eq!(&text[consumed..], "rest");
    }

    #[test]
    fn strip_removes_all_four_carriers() {
        let dirty = format!("a{ZW_ZERO}b{ZW_ONE}c{ZW_META_START}d{ZW_META_END}e");
        assert_eq!(strip_zero_width(&dirty), "abcde");
    }

    #[test]
    fn strip_is_idempotent_and_preserves_unicode() {
        let text = format!("héllo {ZW_ONE}wörld\u{2014}ok");
        let once = strip_zero_width(&text);
        assert_eq!(strip_zero_width(&once), once);
        assert_eq!(once, "héllo wörld\u{2014}ok");
    }

    #[test]
    fn bytes_bits_roundtrip_msb_first() {
        let original = vec![0xDE, 0xAD, 0xBE, 0xEF];
        let bits = bytes_to_bits(&original);
        assert_eq!(bits.len(), 32);
        // 0xDE = 1101_1110
        assert_eq!(&bits[..8], &[1, 1, 0, 1, 1, 1, 1, 0]);
        assert_eq!(bits_to_bytes(&bits), original);
    }

    #[test]
    fn bits_to_bytes_pads_partial_byte() {
        // 10110 -> 1011_0000 = 0xB0
        assert_eq!(bits_to_bytes(&[1, 0, 1, 1, 0]), vec![0xB0]);
    }
}
