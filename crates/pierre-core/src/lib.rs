// ABOUTME: Core types and constants for the Pierre activity sync framework
// ABOUTME: Foundation crate with domain models, error types, constants and stat merging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Core
//!
//! Foundation crate providing shared types and constants for activity sync.
//! This crate is designed to change infrequently, enabling incremental
//! compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Connector, compute, store and codec errors plus sync error codes
//! - **constants**: Sync timing, hashing and stats constants organized by domain
//! - **models**: Activities, stats, streams, athlete profiles and sync events
//! - **merge**: Recursive overlay merge of JSON trees

/// Error taxonomy for connectors and their collaborators
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Activity, ActivityStats, Streams, SyncEvent, etc.)
pub mod models;

/// Schema-agnostic recursive merge
pub mod merge;
