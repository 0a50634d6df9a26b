// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Arithmetic modulo the Mersenne prime p = 2^61 − 1.
//!
//! All aggregation math runs over this field. Elements are plain `u64`
//! values in `[0, p)`; every product and sum goes through a `u128`
//! intermediate before reduction, so no operation can overflow.
//!
//! Real-valued metrics enter the field through [`from_signed`] after
//! fixed-point scaling and leave it through [`to_signed`], which picks
//! the signed representative closest to zero. The signed range that
//! survives a roundtrip without wraparound is roughly ±2^60.

/// The field modulus: 2^61 − 1, a Mersenne prime.
pub const MODULUS: u64 = 2_305_843_009_213_693_951;

/// Largest value that [`to_signed`] maps to a non-negative integer: ⌊p/2⌋.
pub const HALF_MODULUS: u64 = MODULUS / 2;

/// Field addition.
#[inline]
pub fn add(a: u64, b: u64) -> u64 {
    ((a as u128 + b as u128) % MODULUS as u128) as u64
}

/// Field subtraction: `(p + a − (b mod p)) mod p`.
///
/// `b` is reduced first so callers may pass unreduced values.
#[inline]
pub fn sub(a: u64, b: u64) -> u64 {
    let b = b % MODULUS;
    ((MODULUS as u128 + a as u128 - b as u128) % MODULUS as u128) as u64
}

/// Field multiplication through a 128-bit intermediate.
#[inline]
pub fn mul(a: u64, b: u64) -> u64 {
    ((a as u128 * b as u128) % MODULUS as u128) as u64
}

/// Square-and-multiply exponentiation.
pub fn pow(base: u64, mut exp: u64) -> u64 {
    let mut acc: u64 = 1;
    let mut base = base % MODULUS;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul(acc, base);
        }
        base = mul(base, base);
        exp >>= 1;
    }
    acc
}

/// Multiplicative inverse via Fermat's little theorem: `v^(p−2)`.
///
/// Returns 0 for `v = 0`; a correct caller never inverts zero (the
/// Lagrange denominators are differences of distinct evaluation points).
pub fn inverse(value: u64) -> u64 {
    if value % MODULUS == 0 {
        return 0;
    }
    pow(value, MODULUS - 2)
}

/// Embed a signed integer into the field: `((v mod p) + p) mod p`.
#[inline]
pub fn from_signed(value: i64) -> u64 {
    (value as i128).rem_euclid(MODULUS as i128) as u64
}

/// Signed view of a field element: values above ⌊p/2⌋ map negative.
#[inline]
pub fn to_signed(value: u64) -> i64 {
    let value = value % MODULUS;
    if value > HALF_MODULUS {
        (value as i128 - MODULUS as i128) as i64
    } else {
        value as i64
    }
}
