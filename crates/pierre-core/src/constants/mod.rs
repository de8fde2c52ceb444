// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Sync timing, identity hashing and stats computation constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Sync lifecycle constants
pub mod sync {
    /// Bound (ms) on waiting for a STOPPED event after a stop request
    pub const WAIT_FOR_SYNC_STOP_EVENT_TIMEOUT_MS: u64 = 3000;

    /// Minimum remote page size
    pub const MIN_PAGE_SIZE: usize = 10;

    /// Default remote page size
    pub const DEFAULT_PAGE_SIZE: usize = 50;

    /// Maximum remote page size
    pub const MAX_PAGE_SIZE: usize = 200;

    /// Upper bound on memoized athlete snapshot lookups per configuration
    pub const SNAPSHOT_MEMO_CAPACITY: usize = 4096;
}

/// Identity and deduplication hashing constants
pub mod identity {
    /// Hex length of generated ids and content hashes (object-id shaped)
    pub const HASH_HEX_LENGTH: usize = 24;
}

/// Statistics computation constants
pub mod stats {
    /// Peak windows (seconds) computed for speed, power, heart rate and cadence
    pub const PEAK_RANGES_SECONDS: [u32; 11] =
        [5, 10, 20, 30, 60, 120, 300, 600, 1200, 1800, 3600];

    /// Speed (m/s) under which a sample counts as paused
    pub const MOVING_SPEED_THRESHOLD: f64 = 0.5;

    /// Grade (%) beyond which a section counts as climbing or descending
    pub const FLAT_GRADE_THRESHOLD: f64 = 3.0;
}

/// Environment variable names
pub mod env_config {
    /// Enables debug uploads of failing activity files
    pub const DEBUG_ACTIVITY_FILES: &str = "PIERRE_DEBUG_ACTIVITY_FILES";
    /// Base URL of the debug collector
    pub const DEBUG_ENDPOINT: &str = "PIERRE_DEBUG_ENDPOINT";
    /// Stop wait bound override (ms)
    pub const STOP_WAIT_TIMEOUT_MS: &str = "PIERRE_STOP_WAIT_TIMEOUT_MS";
    /// HTTP request timeout (s)
    pub const HTTP_TIMEOUT_SECS: &str = "PIERRE_HTTP_TIMEOUT_SECS";
    /// HTTP connect timeout (s)
    pub const HTTP_CONNECT_TIMEOUT_SECS: &str = "PIERRE_HTTP_CONNECT_TIMEOUT_SECS";
}

/// Service names for structured logging
pub mod service_names {
    /// Activity sync service
    pub const PIERRE_ACTIVITY_SYNC: &str = "pierre-activity-sync";
}
