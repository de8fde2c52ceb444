// ABOUTME: Configuration management module for the activity sync runtime
// ABOUTME: Environment-driven settings threaded through the runtime context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Environment**: debug upload flag and endpoint, stop wait bound, HTTP timeouts

/// Environment configuration
pub mod environment;

pub use environment::{DebugActivityFilesConfig, HttpTimeouts, SyncEnvironment};
