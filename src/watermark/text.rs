// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Text watermarking via zero-width code points.
//!
//! One fingerprint bit per whitespace-delimited token. Bit i is
//! `lsb(stable_hash(token_i ‖ decimal(i))) XOR state_bit_i`, the state
//! bits coming from the keyed stream seeded with
//! `state_seed ^ stable_hash(key)`. The sentinel-framed metadata header
//! is prepended, then each token's bit is injected as a single
//! zero-width code point right after the token, before the following
//! whitespace.
//!
//! Detection is not robust to stripping of the zero-width channel — a
//! stripped document simply reports invalid metadata.

use crate::watermark::hashing::{stable_hash, StateBits};
use crate::watermark::metadata::{Metadata, VERSION};
use crate::watermark::zero_width::{strip_zero_width, ZW_ONE, ZW_ZERO};
use crate::watermark::{score_detection, Detection};

/// Result of embedding a text watermark.
#[derive(Debug, Clone)]
pub struct TextEmbed {
    /// The watermarked document.
    pub watermarked: String,
    /// The injected fingerprint bits, one per token.
    pub fingerprint: Vec<u8>,
    /// The header that was embedded.
    pub metadata: Metadata,
}

/// The six token separators: space, tab, LF, CR, vertical tab, form feed.
///
/// Deliberately ASCII-only; exotic Unicode whitespace is token content,
/// which keeps tokenisation identical across implementations.
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}')
}

/// Split on runs of separators.
fn tokenize(text: &str) -> Vec<&str> {
    text.split(is_separator).filter(|t| !t.is_empty()).collect()
}

/// Fingerprint bits for a token list: content bit XOR state bit.
fn combined_bits(tokens: &[&str], state_seed: u64, key_hash: u64) -> Vec<u8> {
    let mut stream = StateBits::new(state_seed, key_hash);
    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let content = stable_hash(&format!("{token}{index}"));
            ((content & 1) as u8) ^ stream.next_bit()
        })
        .collect()
}

/// Embed a watermark into `payload`.
///
/// Any pre-existing zero-width carriers are stripped first, so
/// embedding is stable under re-embedding. An empty (or all-whitespace)
/// payload produces zero fingerprint bits and a metadata-only output.
pub fn embed(payload: &str, key: &str, state_seed: u64) -> TextEmbed {
    let cleaned = strip_zero_width(payload);
    let tokens = tokenize(&cleaned);
    let metadata = Metadata {
        version: VERSION,
        state_seed,
        key_hash: stable_hash(key),
        fingerprint_length: tokens.len() as u32,
    };
    let fingerprint = combined_bits(&tokens, metadata.state_seed, metadata.key_hash);

    let mut out = metadata.encode_zero_width();
    out.reserve(cleaned.len() + fingerprint.len() * 3);

    let mut token_index = 0usize;
    let mut in_token = false;
    for c in cleaned.chars() {
        if is_separator(c) {
            if in_token {
                if let Some(&bit) = fingerprint.get(token_index) {
                    out.push(if bit == 1 { ZW_ONE } else { ZW_ZERO });
                }
                token_index += 1;
                in_token = false;
            }
            out.push(c);
        } else {
            out.push(c);
            in_token = true;
        }
    }
    if in_token {
        if let Some(&bit) = fingerprint.get(token_index) {
            out.push(if bit == 1 { ZW_ONE } else { ZW_ZERO });
        }
    }

    TextEmbed {
        watermarked: out,
        fingerprint,
        metadata,
    }
}

/// Score `payload` for the presence of a watermark.
///
/// Never fails: a payload without a parseable header (or with a foreign
/// version) reports `metadata_valid = false`, score 0 and a
/// false-positive rate of 1.0.
pub fn detect(payload: &str) -> Detection {
    let (metadata, offset) = match Metadata::decode_zero_width(payload) {
        Some((meta, offset)) if meta.version == VERSION => (meta, offset),
        _ => return Detection::invalid(),
    };

    let remainder = &payload[offset..];
    let stripped = strip_zero_width(remainder);
    let tokens = tokenize(&stripped);
    let expected = combined_bits(&tokens, metadata.state_seed, metadata.key_hash);

    // One extracted bit per zero-width carrier, capped at the token count.
    let mut extracted = Vec::with_capacity(tokens.len());
    for c in remainder.chars() {
        if extracted.len() == tokens.len() {
            break;
        }
        match c {
            ZW_ZERO => extracted.push(0u8),
            ZW_ONE => extracted.push(1u8),
            _ => {}
        }
    }

    score_detection(&expected, &extracted, true)
}
