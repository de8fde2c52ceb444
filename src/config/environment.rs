// ABOUTME: Environment configuration for the activity sync runtime
// ABOUTME: Debug upload feature flag and endpoint, stop wait bound, HTTP timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use pierre_core::constants::{env_config, sync};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

/// Default HTTP request timeout in seconds
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default HTTP connection timeout in seconds
const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Debug collector settings for activity files that failed to sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugActivityFilesConfig {
    /// Uploads are performed only when enabled
    pub enabled: bool,
    /// Base URL of the collector
    pub endpoint: Option<Url>,
}

impl DebugActivityFilesConfig {
    /// Enabled configuration pointing at `endpoint`
    #[must_use]
    pub const fn enabled(endpoint: Url) -> Self {
        Self {
            enabled: true,
            endpoint: Some(endpoint),
        }
    }
}

/// HTTP client timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTimeouts {
    /// Whole request timeout (s)
    pub request_secs: u64,
    /// Connection timeout (s)
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            connect_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Runtime configuration of the sync framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEnvironment {
    /// Debug collector settings
    pub debug_activity_files: DebugActivityFilesConfig,
    /// Bound on the wait for a STOPPED event (ms)
    pub stop_wait_timeout_ms: u64,
    /// HTTP client timeouts
    pub http: HttpTimeouts,
}

impl Default for SyncEnvironment {
    fn default() -> Self {
        Self {
            debug_activity_files: DebugActivityFilesConfig::default(),
            stop_wait_timeout_ms: sync::WAIT_FOR_SYNC_STOP_EVENT_TIMEOUT_MS,
            http: HttpTimeouts::default(),
        }
    }
}

impl SyncEnvironment {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse, or if debug
    /// uploads are enabled without a valid endpoint URL
    pub fn from_env() -> Result<Self> {
        info!("Loading sync configuration from environment variables");

        let enabled = parse_flag(&env_var_or(env_config::DEBUG_ACTIVITY_FILES, "false"))
            .with_context(|| format!("Invalid {} value", env_config::DEBUG_ACTIVITY_FILES))?;

        let endpoint = match env::var(env_config::DEBUG_ENDPOINT) {
            Ok(raw) if !raw.trim().is_empty() => Some(
                Url::parse(raw.trim())
                    .with_context(|| format!("Invalid {} value", env_config::DEBUG_ENDPOINT))?,
            ),
            _ => None,
        };

        if enabled && endpoint.is_none() {
            bail!(
                "{} is enabled but {} is not set",
                env_config::DEBUG_ACTIVITY_FILES,
                env_config::DEBUG_ENDPOINT
            );
        }

        let stop_wait_timeout_ms = env_var_or(
            env_config::STOP_WAIT_TIMEOUT_MS,
            &sync::WAIT_FOR_SYNC_STOP_EVENT_TIMEOUT_MS.to_string(),
        )
        .parse()
        .with_context(|| format!("Invalid {} value", env_config::STOP_WAIT_TIMEOUT_MS))?;

        let http = HttpTimeouts {
            request_secs: env_var_or(
                env_config::HTTP_TIMEOUT_SECS,
                &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
            )
            .parse()
            .with_context(|| format!("Invalid {} value", env_config::HTTP_TIMEOUT_SECS))?,
            connect_secs: env_var_or(
                env_config::HTTP_CONNECT_TIMEOUT_SECS,
                &DEFAULT_HTTP_CONNECT_TIMEOUT_SECS.to_string(),
            )
            .parse()
            .with_context(|| {
                format!("Invalid {} value", env_config::HTTP_CONNECT_TIMEOUT_SECS)
            })?,
        };

        Ok(Self {
            debug_activity_files: DebugActivityFilesConfig { enabled, endpoint },
            stop_wait_timeout_ms,
            http,
        })
    }

    /// Stop wait bound as a `Duration`
    #[must_use]
    pub const fn stop_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_wait_timeout_ms)
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse a boolean flag accepting `true/false`, `1/0`, `yes/no`, `on/off`
fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got '{other}'"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(parse_flag("1").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(!parse_flag("").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_default_stop_wait_is_three_seconds() {
        let env = SyncEnvironment::default();
        assert_eq!(env.stop_wait_timeout(), Duration::from_millis(3000));
        assert!(!env.debug_activity_files.enabled);
    }
}
