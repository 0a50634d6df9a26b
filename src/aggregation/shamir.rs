// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Vectorized Shamir secret sharing over the 2^61 − 1 field.
//!
//! A secret vector of length L is protected by L independent random
//! polynomials of degree t − 1 whose constant terms are the secret
//! components. Party i (1-based) receives the evaluations at x = i;
//! x = 0 is reserved as the recovery abscissa and is never handed out.
//! Any t parties rebuild the vector exactly by Lagrange interpolation
//! at zero; t − 1 parties learn nothing about it.
//!
//! Each distributed share row carries a SHA-256 commitment binding the
//! originator, the evaluation point and the share words, so a corrupted
//! or swapped share is caught before it can poison a reconstruction.

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::aggregation::error::AggregationError;
use crate::aggregation::field;

/// One party's slice of a shared secret vector.
#[derive(Debug, Clone)]
pub struct Share {
    /// Evaluation point: the receiving party's 1-based index.
    pub x: u64,
    /// Evaluations of the L component polynomials at `x`.
    pub values: Vec<u64>,
    /// SHA-256 commitment over `(originator, x, values)`.
    pub commitment: [u8; 32],
}

impl Share {
    /// Re-derive the commitment and compare against the stored one.
    pub fn verify(&self, originator: u64) -> bool {
        commit(originator, self.x, &self.values) == self.commitment
    }
}

/// Commitment over a share: SHA-256 of originator id, evaluation point
/// and the little-endian share words.
pub fn commit(originator: u64, x: u64, values: &[u64]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(originator.to_le_bytes());
    hasher.update(x.to_le_bytes());
    for &v in values {
        hasher.update(v.to_le_bytes());
    }
    hasher.finalize().into()
}

/// A (threshold, parties) sharing configuration.
#[derive(Debug, Clone, Copy)]
pub struct Shamir {
    parties: usize,
    threshold: usize,
}

impl Shamir {
    /// Create a sharing configuration. Requires `1 <= threshold <= parties`.
    pub fn new(parties: usize, threshold: usize) -> Result<Self, AggregationError> {
        if threshold == 0 || threshold > parties {
            return Err(AggregationError::InvalidThreshold);
        }
        Ok(Self { parties, threshold })
    }

    /// Number of parties the secret is split across.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Minimum number of shares needed to reconstruct.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Split `secret` into one [`Share`] per party.
    ///
    /// The t − 1 non-constant coefficients of each component polynomial
    /// are drawn uniformly from the field using the caller's RNG.
    /// `originator` is folded into each share's commitment.
    pub fn share<R: Rng>(&self, secret: &[u64], originator: u64, rng: &mut R) -> Vec<Share> {
        // coefficients[c][k]: k-th coefficient of component c's polynomial,
        // coefficients[c][0] being the secret component itself.
        let coefficients: Vec<Vec<u64>> = secret
            .iter()
            .map(|&component| {
                let mut poly = Vec::with_capacity(self.threshold);
                poly.push(component % field::MODULUS);
                for _ in 1..self.threshold {
                    poly.push(rng.gen_range(0..field::MODULUS));
                }
                poly
            })
            .collect();

        (1..=self.parties as u64)
            .map(|x| {
                let values: Vec<u64> = coefficients
                    .iter()
                    .map(|poly| eval_horner(poly, x))
                    .collect();
                let commitment = commit(originator, x, &values);
                Share { x, values, commitment }
            })
            .collect()
    }

    /// Rebuild the secret vector from at least `threshold` shares.
    ///
    /// `shares` must all have the same length and pairwise-distinct
    /// evaluation points. Only the first `threshold` shares are used.
    pub fn reconstruct(&self, shares: &[Share]) -> Result<Vec<u64>, AggregationError> {
        if shares.len() < self.threshold {
            return Err(AggregationError::InsufficientShares);
        }
        let used = &shares[..self.threshold];
        let width = used[0].values.len();
        if used.iter().any(|s| s.values.len() != width) {
            return Err(AggregationError::ShareShapeMismatch);
        }

        // Lagrange basis at x = 0: L_i(0) = Π_{j≠i} (−x_j) / (x_i − x_j).
        let mut basis = Vec::with_capacity(used.len());
        for (i, si) in used.iter().enumerate() {
            let mut numerator: u64 = 1;
            let mut denominator: u64 = 1;
            for (j, sj) in used.iter().enumerate() {
                if i == j {
                    continue;
                }
                numerator = field::mul(numerator, field::sub(0, sj.x));
                denominator = field::mul(denominator, field::sub(si.x, sj.x));
            }
            basis.push(field::mul(numerator, field::inverse(denominator)));
        }

        let mut secret = vec![0u64; width];
        for (share, &li) in used.iter().zip(basis.iter()) {
            for (acc, &value) in secret.iter_mut().zip(share.values.iter()) {
                *acc = field::add(*acc, field::mul(value, li));
            }
        }
        Ok(secret)
    }
}

/// Horner evaluation of `poly` (lowest coefficient first) at `x`.
fn eval_horner(poly: &[u64], x: u64) -> u64 {
    let mut acc = 0u64;
    for &coefficient in poly.iter().rev() {
        acc = field::add(field::mul(acc, x), coefficient);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(0xC0FFEE)
    }

    #[test]
    fn any_threshold_subset_recovers() {
        let sharer = Shamir::new(5, 3).unwrap();
        let secret = vec![42u64, 0, field::MODULUS - 1, 1 << 60];
        let shares = sharer.share(&secret, 7, &mut rng());
        assert_eq!(shares.len(), 5);

        // every 3-subset of the 5 shares must recover the secret
        for a in 0..5 {
            for b in (a + 1)..5 {
                for c in (b + 1)..5 {
                    let subset = vec![shares[a].clone(), shares[b].clone(), shares[c].clone()];
                    let recovered = sharer.reconstruct(&subset).unwrap();
                    assert_eq!(recovered, secret, "subset ({a},{b},{c})");
                }
            }
        }
    }

    #[test]
    fn below_threshold_rejected() {
        let sharer = Shamir::new(4, 3).unwrap();
        let shares = sharer.share(&[9, 9, 9], 0, &mut rng());
        let two = vec![shares[0].clone(), shares[3].clone()];
        assert_eq!(
            sharer.reconstruct(&two).unwrap_err(),
            AggregationError::InsufficientShares
        );
    }

    #[test]
    fn evaluation_points_are_one_based() {
        let sharer = Shamir::new(3, 2).unwrap();
        let shares = sharer.share(&[5], 1, &mut rng());
        let xs: Vec<u64> = shares.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![1, 2, 3]);
    }

    #[test]
    fn threshold_one_is_plain_replication() {
        let sharer = Shamir::new(3, 1).unwrap();
        let secret = vec![123u64, 456];
        let shares = sharer.share(&secret, 2, &mut rng());
        for share in &shares {
            assert_eq!(share.values, secret);
        }
    }

    #[test]
    fn commitment_binds_share_contents() {
        let sharer = Shamir::new(3, 2).unwrap();
        let shares = sharer.share(&[77, 88], 4, &mut rng());
        assert!(shares[0].verify(4));
        assert!(!shares[0].verify(5), "wrong originator must not verify");

        let mut tampered = shares[1].clone();
        tampered.values[0] = field::add(tampered.values[0], 1);
        assert!(!tampered.verify(4));
    }

    #[test]
    fn invalid_threshold_rejected() {
        assert_eq!(
            Shamir::new(3, 0).unwrap_err(),
            AggregationError::InvalidThreshold
        );
        assert_eq!(
            Shamir::new(3, 4).unwrap_err(),
            AggregationError::InvalidThreshold
        );
    }

    #[test]
    fn ragged_shares_rejected() {
        let sharer = Shamir::new(3, 2).unwrap();
        let mut shares = sharer.share(&[1, 2, 3], 0, &mut rng());
        shares[1].values.pop();
        assert_eq!(
            sharer.reconstruct(&shares).unwrap_err(),
            AggregationError::ShareShapeMismatch
        );
    }
}
