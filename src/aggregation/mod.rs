// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Fault-tolerant masked aggregation.
//!
//! Computes a secure sum (and derived mean/variance) of private metric
//! vectors contributed by N clients, tolerating the dropout of up to
//! N − t clients. Layered bottom-up:
//!
//! - [`field`]: arithmetic modulo the Mersenne prime 2^61 − 1.
//! - [`shamir`]: vectorized threshold secret sharing over that field,
//!   with SHA-256 share commitments.
//! - [`coordinator`]: per-client mask construction, masked-payload
//!   registration and final aggregation with dropout recovery.
//!
//! Everything is synchronous and single-threaded; the [`Coordinator`]
//! owns all per-client state and must not be shared across threads
//! mid-protocol.

pub mod coordinator;
pub mod error;
pub mod field;
pub mod shamir;

pub use coordinator::{AggregationResult, Coordinator, DEFAULT_SCALE};
pub use error::AggregationError;
pub use shamir::{Shamir, Share};
