// ABOUTME: Activity identity: random primary-key ids and stable content hashes
// ABOUTME: Content hashes only use recorded facts so repeated syncs reproduce them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Activity Identity
//!
//! Two digests with different purposes:
//! - [`generate_activity_id`] assigns a fresh primary key. It is seeded with
//!   the wall clock and a random value, so two calls never agree.
//! - [`content_hash`] fingerprints the recorded facts of an activity and is
//!   the deduplication key across syncs of the same physical activity.

use chrono::{SecondsFormat, Utc};
use pierre_core::constants::identity::HASH_HEX_LENGTH;
use pierre_core::models::BareActivity;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a new 24 hex character activity id
#[must_use]
pub fn generate_activity_id(bare: &BareActivity) -> String {
    let random: u64 = rand::thread_rng().gen();
    let seed = format!(
        "{}:{}:{}:{random}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        bare.start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        bare.end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    truncated_sha256(&seed)
}

/// Stable fingerprint of an activity's recorded facts
///
/// Hashes sport, start and end at second precision. Never depends on the
/// wall clock.
#[must_use]
pub fn content_hash(bare: &BareActivity) -> String {
    let seed = format!(
        "{}:{}:{}",
        bare.sport.as_key(),
        bare.start_time.timestamp(),
        bare.end_time.timestamp()
    );
    truncated_sha256(&seed)
}

/// sha256 of `seed` truncated to an object-id shaped hex string
pub(crate) fn truncated_sha256(seed: &str) -> String {
    let mut digest = hex::encode(Sha256::digest(seed.as_bytes()));
    digest.truncate(HASH_HEX_LENGTH);
    digest
}
