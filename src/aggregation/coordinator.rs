// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Fault-tolerant masked aggregation of private metric vectors.
//!
//! N clients each contribute a length-D metric vector. The coordinator
//! computes the exact sum (and derived mean/variance) without ever
//! seeing an unmasked contribution, and tolerates the dropout of up to
//! N − t clients, t being the Shamir reconstruction threshold:
//!
//! 1. At registration a client's metrics are fixed-point scaled into a
//!    2D field vector (values, then squares), blinded by a fresh
//!    *personal mask* (Shamir-shared with the other clients) and by one
//!    antisymmetric *pairwise mask* per peer. The lower-id side of a
//!    pair adds the mask, the higher-id side subtracts it, so the pair
//!    cancels once both register.
//! 2. At finalization the registered payloads are summed; active
//!    clients' personal masks are subtracted directly; a dropped
//!    registrant's mask is rebuilt from any t surviving share-holders;
//!    pairwise masks pointing at never-registered ids are regenerated
//!    from their recorded seeds and undone per referrer.
//!
//! The protocol targets honest-but-curious parties. It does not defend
//! against a coordinator that forges transcripts.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_mt::Mt64;
use zeroize::Zeroizing;

use crate::aggregation::error::AggregationError;
use crate::aggregation::field;
use crate::aggregation::shamir::{Shamir, Share};

/// Default fixed-point scale: six decimal digits of metric precision.
pub const DEFAULT_SCALE: u64 = 1_000_000;

/// Golden-ratio increment for the 64-bit seed fold.
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Per-client protocol state, owned by the coordinator.
///
/// Mutated exactly once, by the owning client's registration; read-only
/// during finalization.
#[derive(Debug)]
struct ClientState {
    /// The real-valued input vector, kept for audit.
    original_metrics: Vec<f64>,
    /// Masked 2D field vector handed back at registration.
    masked_payload: Vec<u64>,
    /// Fresh uniform blinding vector; wiped on drop.
    personal_mask: Zeroizing<Vec<u64>>,
    /// Share of client j's personal mask that this client holds,
    /// keyed by originator id j.
    incoming_shares: BTreeMap<usize, Share>,
    /// Deterministic seed for the pairwise mask against peer j.
    pairwise_seeds: BTreeMap<usize, u64>,
    /// Monotone flag, false → true once.
    registered: bool,
}

impl ClientState {
    fn new() -> Self {
        Self {
            original_metrics: Vec::new(),
            masked_payload: Vec::new(),
            personal_mask: Zeroizing::new(Vec::new()),
            incoming_shares: BTreeMap::new(),
            pairwise_seeds: BTreeMap::new(),
            registered: false,
        }
    }
}

/// Decoded aggregation output in metric units.
#[derive(Debug, Clone)]
pub struct AggregationResult {
    /// Componentwise sum over all registered contributions.
    pub sum: Vec<f64>,
    /// `sum / participants`.
    pub mean: Vec<f64>,
    /// Population variance per component, clamped at 0.
    pub variance: Vec<f64>,
    /// Number of clients that registered.
    pub participants: usize,
    /// Number of clients in the active set at finalization.
    pub survivors: usize,
    /// The Shamir reconstruction threshold.
    pub threshold: usize,
}

/// Coordinator for one aggregation run.
///
/// Owns all per-client state and the mask RNG. Not thread-safe: callers
/// must not interleave [`register_client`](Coordinator::register_client)
/// with itself or with [`finalize`](Coordinator::finalize) on the same
/// instance. Distinct instances are independent.
#[derive(Debug)]
pub struct Coordinator {
    num_clients: usize,
    threshold: usize,
    dimension: usize,
    scale: u64,
    sharer: Shamir,
    clients: Vec<ClientState>,
    rng: ChaCha20Rng,
}

impl Coordinator {
    /// Create a coordinator with the default scale and an OS-entropy RNG.
    pub fn new(
        num_clients: usize,
        threshold: usize,
        dimension: usize,
    ) -> Result<Self, AggregationError> {
        Self::with_scale(num_clients, threshold, dimension, DEFAULT_SCALE)
    }

    /// Create a coordinator with an explicit fixed-point scale.
    pub fn with_scale(
        num_clients: usize,
        threshold: usize,
        dimension: usize,
        scale: u64,
    ) -> Result<Self, AggregationError> {
        Self::build(num_clients, threshold, dimension, scale, ChaCha20Rng::from_entropy())
    }

    /// Create a reproducible coordinator from a fixed seed.
    ///
    /// Intended for tests and replayable runs; production callers should
    /// prefer the entropy-seeded constructors.
    pub fn seeded(
        num_clients: usize,
        threshold: usize,
        dimension: usize,
        scale: u64,
        seed: u64,
    ) -> Result<Self, AggregationError> {
        Self::build(num_clients, threshold, dimension, scale, ChaCha20Rng::seed_from_u64(seed))
    }

    fn build(
        num_clients: usize,
        threshold: usize,
        dimension: usize,
        scale: u64,
        rng: ChaCha20Rng,
    ) -> Result<Self, AggregationError> {
        if dimension == 0 {
            return Err(AggregationError::InvalidDimension);
        }
        if scale == 0 {
            return Err(AggregationError::InvalidScale);
        }
        let sharer = Shamir::new(num_clients, threshold)?;
        let clients = (0..num_clients).map(|_| ClientState::new()).collect();
        Ok(Self {
            num_clients,
            threshold,
            dimension,
            scale,
            sharer,
            clients,
            rng,
        })
    }

    /// Metric dimension D.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The original metric vector a client registered with, for audit.
    /// `None` until the client registers.
    pub fn registered_metrics(&self, id: usize) -> Option<&[f64]> {
        let state = self.clients.get(id)?;
        state.registered.then(|| state.original_metrics.as_slice())
    }

    /// Register client `id` with its metric vector.
    ///
    /// Returns the masked 2D payload (exposed for audit/transport;
    /// callers normally discard it). Registration is irrevocable.
    ///
    /// # Errors
    /// - [`AggregationError::ClientOutOfRange`] if `id >= num_clients`.
    /// - [`AggregationError::AlreadyRegistered`] on a repeat registration.
    /// - [`AggregationError::MetricLengthMismatch`] if `metrics.len() != D`.
    pub fn register_client(
        &mut self,
        id: usize,
        metrics: &[f64],
    ) -> Result<Vec<u64>, AggregationError> {
        if id >= self.num_clients {
            return Err(AggregationError::ClientOutOfRange);
        }
        if self.clients[id].registered {
            return Err(AggregationError::AlreadyRegistered);
        }
        if metrics.len() != self.dimension {
            return Err(AggregationError::MetricLengthMismatch);
        }

        let scaled = self.scale_metrics(metrics);

        // Fresh personal mask, uniform over Field^2D.
        let width = 2 * self.dimension;
        let mut personal_mask = Zeroizing::new(Vec::with_capacity(width));
        for _ in 0..width {
            personal_mask.push(self.rng.gen_range(0..field::MODULUS));
        }

        // Distribute Shamir shares of the mask to every other client.
        let shares = self.sharer.share(&personal_mask, id as u64, &mut self.rng);
        for (holder, share) in shares.into_iter().enumerate() {
            if holder != id {
                self.clients[holder].incoming_shares.insert(id, share);
            }
        }

        // payload = scaled + personal mask, then one pairwise term per peer.
        let mut payload: Vec<u64> = scaled
            .iter()
            .zip(personal_mask.iter())
            .map(|(&s, &m)| field::add(s, m))
            .collect();

        let mut seeds = BTreeMap::new();
        for peer in 0..self.num_clients {
            if peer == id {
                continue;
            }
            let seed = pair_seed(id.min(peer) as u64 + 1, id.max(peer) as u64 + 1, self.scale);
            let mask = pairwise_mask(seed, width);
            if id < peer {
                for (p, m) in payload.iter_mut().zip(mask.iter()) {
                    *p = field::add(*p, *m);
                }
            } else {
                for (p, m) in payload.iter_mut().zip(mask.iter()) {
                    *p = field::sub(*p, *m);
                }
            }
            seeds.insert(peer, seed);
        }

        let state = &mut self.clients[id];
        state.original_metrics = metrics.to_vec();
        state.masked_payload = payload.clone();
        state.personal_mask = personal_mask;
        state.pairwise_seeds = seeds;
        state.registered = true;

        Ok(payload)
    }

    /// Aggregate over the given active set and decode the result.
    ///
    /// Every id in `active` must be a distinct, registered client, and
    /// `active.len() >= threshold`. Registered clients outside the
    /// active set have their personal masks rebuilt from the shares the
    /// active clients hold; never-registered ids have the pairwise
    /// terms that were booked against them regenerated and undone.
    ///
    /// # Errors
    /// - [`AggregationError::BelowThreshold`] if `active.len() < threshold`.
    /// - [`AggregationError::InsufficientShares`] if a dropped
    ///   registrant has fewer than `threshold` surviving share-holders.
    /// - [`AggregationError::ShareCommitmentMismatch`] if a collected
    ///   share fails its commitment check.
    pub fn finalize(&self, active: &[usize]) -> Result<AggregationResult, AggregationError> {
        if active.len() < self.threshold {
            return Err(AggregationError::BelowThreshold);
        }
        let mut seen = vec![false; self.num_clients];
        for &id in active {
            if id >= self.num_clients {
                return Err(AggregationError::ClientOutOfRange);
            }
            if !self.clients[id].registered {
                return Err(AggregationError::UnregisteredActiveClient);
            }
            if seen[id] {
                return Err(AggregationError::DuplicateActiveClient);
            }
            seen[id] = true;
        }

        let registered: Vec<usize> = (0..self.num_clients)
            .filter(|&id| self.clients[id].registered)
            .collect();
        if registered.is_empty() {
            return Err(AggregationError::NoParticipants);
        }

        let width = 2 * self.dimension;
        let mut agg = vec![0u64; width];

        // Sum of all registered payloads; never-registered clients
        // contribute nothing.
        for &id in &registered {
            for (acc, &v) in agg.iter_mut().zip(self.clients[id].masked_payload.iter()) {
                *acc = field::add(*acc, v);
            }
        }

        // Active clients' personal masks come off directly.
        for &id in active {
            for (acc, &m) in agg.iter_mut().zip(self.clients[id].personal_mask.iter()) {
                *acc = field::sub(*acc, m);
            }
        }

        // Registered-but-inactive masks are rebuilt from surviving shares.
        for &dropped in registered.iter().filter(|id| !seen[**id]) {
            let mut collected: Vec<Share> = Vec::with_capacity(self.threshold);
            for &survivor in active {
                if let Some(share) = self.clients[survivor].incoming_shares.get(&dropped) {
                    if !share.verify(dropped as u64) {
                        return Err(AggregationError::ShareCommitmentMismatch);
                    }
                    collected.push(share.clone());
                    if collected.len() == self.threshold {
                        break;
                    }
                }
            }
            if collected.len() < self.threshold {
                return Err(AggregationError::InsufficientShares);
            }
            let mask = self.sharer.reconstruct(&collected)?;
            for (acc, &m) in agg.iter_mut().zip(mask.iter()) {
                *acc = field::sub(*acc, m);
            }
        }

        // Pairwise terms booked against never-registered ids: undo one
        // term per registered referrer (every registered payload is in
        // the sum, so every referrer's term must come off).
        for absent in (0..self.num_clients).filter(|&id| !self.clients[id].registered) {
            for &referrer in &registered {
                if let Some(&seed) = self.clients[referrer].pairwise_seeds.get(&absent) {
                    let mask = pairwise_mask(seed, width);
                    if referrer < absent {
                        for (acc, &m) in agg.iter_mut().zip(mask.iter()) {
                            *acc = field::sub(*acc, m);
                        }
                    } else {
                        for (acc, &m) in agg.iter_mut().zip(mask.iter()) {
                            *acc = field::add(*acc, m);
                        }
                    }
                }
            }
        }

        Ok(self.decode(&agg, registered.len(), active.len()))
    }

    /// Fixed-point scale a metric vector into the 2D field layout:
    /// slots [0, D) hold the scaled values, slots [D, 2D) their squares.
    fn scale_metrics(&self, metrics: &[f64]) -> Vec<u64> {
        let mut out = Vec::with_capacity(2 * self.dimension);
        for &m in metrics {
            let scaled = (m * self.scale as f64).round() as i64;
            out.push(field::from_signed(scaled));
        }
        for &m in metrics {
            let scaled = (m * self.scale as f64).round() as i64;
            let square = (scaled as i128 * scaled as i128).rem_euclid(field::MODULUS as i128);
            out.push(square as u64);
        }
        out
    }

    /// De-scale the aggregated field vector into metric units.
    fn decode(&self, agg: &[u64], participants: usize, survivors: usize) -> AggregationResult {
        let d = self.dimension;
        let scale = self.scale as f64;
        let n = participants as f64;

        let sum: Vec<f64> = (0..d).map(|i| field::to_signed(agg[i]) as f64 / scale).collect();
        let mean: Vec<f64> = sum.iter().map(|s| s / n).collect();
        let variance: Vec<f64> = (0..d)
            .map(|i| {
                let mean_square = field::to_signed(agg[d + i]) as f64 / (scale * scale) / n;
                (mean_square - mean[i] * mean[i]).max(0.0)
            })
            .collect();

        AggregationResult {
            sum,
            mean,
            variance,
            participants,
            survivors,
            threshold: self.threshold,
        }
    }
}

/// Symmetric deterministic seed for the pairwise mask between two
/// clients: fold the sorted 1-based ids and the scale with a standard
/// 64-bit hash-combine (golden-ratio constant, shift-xor pattern).
/// Callers pass the smaller id first, so swapping the pair is a no-op.
pub(crate) fn pair_seed(low: u64, high: u64, scale: u64) -> u64 {
    let mut acc = 0u64;
    for v in [low, high, scale] {
        acc ^= mix64(v)
            .wrapping_add(GOLDEN_GAMMA)
            .wrapping_add(acc << 6)
            .wrapping_add(acc >> 2);
    }
    acc
}

/// 64-bit avalanche mixer (splitmix64 finalizer).
fn mix64(mut v: u64) -> u64 {
    v = v.wrapping_add(GOLDEN_GAMMA);
    v = (v ^ (v >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    v = (v ^ (v >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    v ^ (v >> 31)
}

/// Deterministic pseudorandom field vector for a pairwise mask.
///
/// Both sides of a pair must derive the identical vector from the same
/// seed; the generator is therefore pinned to mt19937_64, not to
/// whatever `rand` happens to default to.
pub(crate) fn pairwise_mask(seed: u64, len: usize) -> Vec<u64> {
    let mut rng = Mt64::new(seed);
    (0..len).map(|_| rng.next_u64() % field::MODULUS).collect()
}
