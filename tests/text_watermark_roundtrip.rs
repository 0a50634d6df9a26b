// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Text watermark embed → detect roundtrips, plus the documented
//! failure modes: stripped carriers, corrupted metadata, foreign text.

use veil_core::watermark::zero_width::{ZW_ONE, ZW_ZERO};
use veil_core::{strip_zero_width, text_detect, text_embed};

const SAMPLE: &str = "the quick brown fox jumps over the lazy dog";

#[test]
fn clean_roundtrip_scores_perfectly() {
    let marked = text_embed(SAMPLE, "secret-key", 0xDEAD_BEEF);
    let detection = text_detect(&marked.watermarked);

    assert!(detection.metadata_valid);
    assert_eq!(detection.total_bits, 9); // one bit per token
    assert_eq!(detection.matching_bits, 9);
    assert_eq!(detection.score, 1.0);
    assert!(detection.false_positive_rate < 0.01);
}

#[test]
fn metadata_reports_the_embedding_parameters() {
    let marked = text_embed(SAMPLE, "secret-key", 77);
    assert_eq!(marked.metadata.version, 1);
    assert_eq!(marked.metadata.state_seed, 77);
    assert_eq!(marked.metadata.fingerprint_length, 9);
    assert_eq!(marked.fingerprint.len(), 9);
}

#[test]
fn stripping_the_carriers_kills_detection() {
    let marked = text_embed(SAMPLE, "secret-key", 1);
    let stripped = strip_zero_width(&marked.watermarked);
    assert_eq!(stripped, SAMPLE);

    let detection = text_detect(&stripped);
    assert!(!detection.metadata_valid);
    assert_eq!(detection.score, 0.0);
    assert_eq!(detection.false_positive_rate, 1.0);
}

#[test]
fn strip_is_idempotent_on_watermarked_text() {
    let marked = text_embed(SAMPLE, "k", 5);
    let once = strip_zero_width(&marked.watermarked);
    let twice = strip_zero_width(&once);
    assert_eq!(once, twice);
}

#[test]
fn unwatermarked_text_reports_invalid_metadata() {
    let detection = text_detect("just some ordinary prose, nothing hidden");
    assert!(!detection.metadata_valid);
    assert_eq!(detection.false_positive_rate, 1.0);
}

#[test]
fn empty_payload_roundtrip() {
    let marked = text_embed("", "k", 9);
    let detection = text_detect(&marked.watermarked);
    assert!(detection.metadata_valid);
    assert_eq!(detection.total_bits, 0);
    assert_eq!(detection.score, 0.0);
    assert_eq!(detection.false_positive_rate, 1.0);
}

/// Corrupting one bit inside the state_seed field of the header leaves
/// the frame parseable (so metadata still reads as valid) but derails
/// the whole expected bit stream. Text has no header redundancy.
#[test]
fn corrupted_state_seed_degrades_score() {
    // 64 tokens so a chance-perfect score is out of the question
    let long: String = (0..64).map(|i| format!("tok{i} ")).collect();
    let marked = text_embed(long.trim_end(), "secret-key", 0x1234_5678);

    // header chars: [start sentinel][192 bits][end sentinel].
    // bit 40 lies inside the state_seed field (bits 32..96).
    let corrupted: String = marked
        .watermarked
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i == 1 + 40 {
                if c == ZW_ZERO {
                    ZW_ONE
                } else {
                    ZW_ZERO
                }
            } else {
                c
            }
        })
        .collect();

    let detection = text_detect(&corrupted);
    assert!(detection.metadata_valid, "frame still parses");
    assert_eq!(detection.total_bits, 64);
    assert!(detection.score < 1.0, "seed corruption must break the stream");
}

#[test]
fn detection_recovers_key_hash_from_metadata() {
    // the detector needs no key: everything it needs rides in the header
    let marked = text_embed("verify me without the key", "a very private key", 99);
    let detection = text_detect(&marked.watermarked);
    assert!(detection.metadata_valid);
    assert_eq!(detection.score, 1.0);
}

#[test]
fn multibyte_tokens_roundtrip() {
    let marked = text_embed("naïve café 東京 ok", "k", 3);
    let detection = text_detect(&marked.watermarked);
    assert!(detection.metadata_valid);
    assert_eq!(detection.total_bits, 4);
    assert_eq!(detection.score, 1.0);
}

#[test]
fn reembedding_over_an_existing_mark_is_clean() {
    let first = text_embed(SAMPLE, "old-key", 1);
    let second = text_embed(&first.watermarked, "new-key", 2);
    // the old carriers are stripped before re-embedding
    assert_eq!(strip_zero_width(&second.watermarked), SAMPLE);
    let detection = text_detect(&second.watermarked);
    assert_eq!(detection.score, 1.0);
    assert_eq!(detection.total_bits, 9);
}
