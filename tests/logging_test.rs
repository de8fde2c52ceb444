// ABOUTME: Tests for logging configuration parsing
// ABOUTME: Format selection and environment driven settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use pierre_activity_sync::logging::{LogFormat, LoggingConfig};
use serial_test::serial;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str_or_default("json"), LogFormat::Json);
    assert_eq!(LogFormat::from_str_or_default("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::from_str_or_default("compact"), LogFormat::Compact);
    assert_eq!(LogFormat::from_str_or_default("pretty"), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str_or_default("anything"), LogFormat::Pretty);
}

#[test]
fn test_default_config() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.service_name, "pierre-activity-sync");
    assert!(!config.include_location);
}

#[test]
#[serial]
fn test_config_from_environment() {
    env::set_var("LOG_FORMAT", "json");
    env::set_var("LOG_INCLUDE_LOCATION", "1");
    env::set_var("SERVICE_NAME", "sync-under-test");

    let config = LoggingConfig::from_env();

    assert_eq!(config.format, LogFormat::Json);
    assert!(config.include_location);
    assert!(!config.include_thread);
    assert_eq!(config.service_name, "sync-under-test");

    env::remove_var("LOG_FORMAT");
    env::remove_var("LOG_INCLUDE_LOCATION");
    env::remove_var("SERVICE_NAME");
}
