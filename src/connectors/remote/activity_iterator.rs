// ABOUTME: Streaming iterator over the paginated activity listing of a remote source
// ABOUTME: Fetches pages lazily and stops on the first short page
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Streaming Activity Iterator
//!
//! Pages are fetched on demand and buffered one at a time, so memory stays
//! bounded by the page size however long the history is.

use std::collections::VecDeque;
use std::pin::Pin;

use async_stream::try_stream;
use futures_util::Stream;
use pierre_core::constants::sync::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};

use super::{RemoteActivity, RemoteActivitySource, RemoteSourceError};

/// Configuration for activity streaming behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Number of activities to fetch per page
    pub page_size: usize,
    /// Maximum total activities to fetch (None for unlimited)
    pub max_activities: Option<usize>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_activities: None,
        }
    }
}

impl StreamConfig {
    /// Create configuration with specified page size, clamped to the allowed range
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
            max_activities: None,
        }
    }

    /// Set maximum number of activities to fetch
    #[must_use]
    pub const fn with_max_activities(mut self, max: usize) -> Self {
        self.max_activities = Some(max);
        self
    }
}

/// Stream of remote activity summaries
pub type RemoteActivityStream<'a> =
    Pin<Box<dyn Stream<Item = Result<RemoteActivity, RemoteSourceError>> + Send + 'a>>;

/// Create a streaming iterator over the activities of `source`
///
/// Pages are numbered from 1. A page shorter than the page size is the last.
pub fn create_activity_stream<S>(source: &S, config: StreamConfig) -> RemoteActivityStream<'_>
where
    S: RemoteActivitySource + ?Sized,
{
    let page_size = config.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
    let max_activities = config.max_activities;

    Box::pin(try_stream! {
        let mut buffer: VecDeque<RemoteActivity> = VecDeque::new();
        let mut page: u32 = 1;
        let mut yielded_count: usize = 0;
        let mut exhausted = false;

        loop {
            if max_activities.is_some_and(|max| yielded_count >= max) {
                break;
            }

            if let Some(activity) = buffer.pop_front() {
                yielded_count += 1;
                yield activity;
                continue;
            }

            if exhausted {
                break;
            }

            let items = source.list_activities(page, page_size).await?;
            exhausted = items.len() < page_size;
            buffer.extend(items);
            page += 1;
        }
    })
}
