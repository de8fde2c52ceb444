// ABOUTME: Tests for the replayable sync event stream and its subscriptions
// ABOUTME: Validates ordering, late subscribers, closing semantics and stream adapters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::time::Duration;

use common::{collect_events, event_types};
use futures_util::StreamExt;
use pierre_activity_sync::events::SyncEventStream;
use pierre_core::models::{ConnectorType, SyncEvent, SyncEventType};
use tokio::{task, time};

const CONNECTOR: ConnectorType = ConnectorType::FileSystem;

#[tokio::test]
async fn test_late_subscriber_replays_full_history() {
    let stream = SyncEventStream::new();
    assert!(stream.push(SyncEvent::started(CONNECTOR)));
    assert!(stream.push(SyncEvent::generic(CONNECTOR, "2 activity files found")));
    assert!(stream.push_and_close(SyncEvent::complete(CONNECTOR)));

    let events = collect_events(&stream).await;
    assert_eq!(
        event_types(&events),
        vec![
            SyncEventType::Started,
            SyncEventType::Generic,
            SyncEventType::Complete
        ]
    );
}

#[tokio::test]
async fn test_subscribers_observe_same_order() {
    let stream = SyncEventStream::new();
    let early = stream.subscribe();

    let producer = stream.clone();
    let handle = tokio::spawn(async move {
        producer.push(SyncEvent::started(CONNECTOR));
        for index in 0..20 {
            producer.push(SyncEvent::generic(CONNECTOR, format!("step {index}")));
            task::yield_now().await;
        }
        producer.push_and_close(SyncEvent::complete(CONNECTOR));
    });

    let early_events: Vec<SyncEvent> = early.into_stream().collect().await;
    handle.await.unwrap();
    let late_events = collect_events(&stream).await;

    assert_eq!(early_events.len(), 22);
    assert_eq!(early_events, late_events);
}

#[tokio::test]
async fn test_closed_stream_rejects_events() {
    let stream = SyncEventStream::new();
    stream.push(SyncEvent::started(CONNECTOR));
    stream.close();

    assert!(stream.is_closed());
    assert!(!stream.push(SyncEvent::generic(CONNECTOR, "too late")));
    assert!(!stream.push_and_close(SyncEvent::stopped(CONNECTOR)));
    assert_eq!(stream.len(), 1);
}

#[tokio::test]
async fn test_subscription_waits_for_next_event() {
    let stream = SyncEventStream::new();
    let mut subscription = stream.subscribe();

    let pending = time::timeout(Duration::from_millis(50), subscription.next()).await;
    assert!(pending.is_err(), "no event should be available yet");

    stream.push(SyncEvent::started(CONNECTOR));
    let event = time::timeout(Duration::from_secs(5), subscription.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.event_type(), SyncEventType::Started);
}

#[tokio::test]
async fn test_subscription_outlives_dropped_stream_handle() {
    let stream = SyncEventStream::closed_with(vec![SyncEvent::started(CONNECTOR)]);
    let mut subscription = stream.subscribe();
    drop(stream);

    assert_eq!(
        subscription.next().await.map(|event| event.event_type()),
        Some(SyncEventType::Started)
    );
    assert!(subscription.next().await.is_none());
}

#[test]
fn test_clones_share_one_stream() {
    let stream = SyncEventStream::new();
    let clone = stream.clone();
    clone.push(SyncEvent::started(CONNECTOR));

    assert!(stream.same_stream(&clone));
    assert!(!stream.same_stream(&SyncEventStream::new()));
    assert_eq!(stream.events(), clone.events());
}

#[test]
fn test_terminal_events() {
    assert!(SyncEvent::stopped(CONNECTOR).is_terminal());
    assert!(SyncEvent::complete(CONNECTOR).is_terminal());
    assert!(!SyncEvent::started(CONNECTOR).is_terminal());
    assert!(!SyncEvent::generic(CONNECTOR, "progress").is_terminal());
}
