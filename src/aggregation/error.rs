// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Error types for the masked aggregation protocol.
//!
//! [`AggregationError`] covers construction, registration and
//! finalization failures. Field and Shamir arithmetic never fail at
//! runtime; everything here is an input-validation or protocol-state
//! problem surfaced to the caller.

use core::fmt;

/// Errors that can occur while running the aggregation protocol.
#[derive(Debug, PartialEq, Eq)]
pub enum AggregationError {
    /// Threshold outside `[1, num_clients]`.
    InvalidThreshold,
    /// Metric dimension is zero.
    InvalidDimension,
    /// Fixed-point scale is zero.
    InvalidScale,
    /// Client id is not in `[0, num_clients)`.
    ClientOutOfRange,
    /// The client already registered; registration is irrevocable.
    AlreadyRegistered,
    /// A metrics vector whose length differs from the configured dimension.
    MetricLengthMismatch,
    /// The same client id appears twice in the active set.
    DuplicateActiveClient,
    /// An active id refers to a client that never registered.
    UnregisteredActiveClient,
    /// Fewer active clients than the reconstruction threshold.
    BelowThreshold,
    /// No client ever registered; there is nothing to aggregate.
    NoParticipants,
    /// A dropped-out client's mask cannot be rebuilt: fewer than
    /// `threshold` surviving share-holders.
    InsufficientShares,
    /// A held share failed its SHA-256 commitment check.
    ShareCommitmentMismatch,
    /// Share rows and evaluation points disagree in count or length.
    ShareShapeMismatch,
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidThreshold => write!(f, "threshold must be in [1, num_clients]"),
            Self::InvalidDimension => write!(f, "metric dimension must be at least 1"),
            Self::InvalidScale => write!(f, "fixed-point scale must be at least 1"),
            Self::ClientOutOfRange => write!(f, "client id out of range"),
            Self::AlreadyRegistered => write!(f, "client already registered"),
            Self::MetricLengthMismatch => write!(f, "metrics length does not match dimension"),
            Self::DuplicateActiveClient => write!(f, "duplicate client id in active set"),
            Self::UnregisteredActiveClient => write!(f, "active set names an unregistered client"),
            Self::BelowThreshold => write!(f, "active set smaller than reconstruction threshold"),
            Self::NoParticipants => write!(f, "no registered participants"),
            Self::InsufficientShares => {
                write!(f, "not enough surviving shares to rebuild a dropped mask")
            }
            Self::ShareCommitmentMismatch => write!(f, "share failed its commitment check"),
            Self::ShareShapeMismatch => write!(f, "share grid shape mismatch"),
        }
    }
}

impl std::error::Error for AggregationError {}
