// ABOUTME: Runtime context passed by reference to connectors instead of a global service
// ABOUTME: Host identity, sync environment and the shared HTTP client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Runtime Context
//!
//! Built once at process start and threaded through connector constructors
//! as an `Arc<RuntimeContext>`. Nothing in the crate reads host information
//! from global state.

mod runtime;

pub use runtime::{RuntimeContext, RuntimeInfo};
