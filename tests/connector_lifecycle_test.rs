// ABOUTME: Tests for the connector lifecycle: configuration, run state and sync start rules
// ABOUTME: Validates rejected starts, fresh streams per run and configuration errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::{
    collect_events, event_types, ftp_history, single_error, test_context, utc, TickingConnector,
};
use pierre_activity_sync::connectors::{Connector, ConnectorConfig};
use pierre_core::errors::{ConnectorError, SyncErrorCode};
use pierre_core::models::{AthleteProfileHistory, ConnectorType, SyncEvent, SyncEventType};
use serde_json::json;

fn remote_config() -> ConnectorConfig {
    ConnectorConfig::new(ConnectorType::RemoteApi, ftp_history())
}

#[tokio::test]
async fn test_sync_before_configure_returns_closed_error_stream() {
    let connector = Arc::new(TickingConnector::new(test_context(), true));

    let stream = Arc::clone(&connector).sync();

    assert!(stream.is_closed());
    let events = collect_events(&stream).await;
    assert_eq!(event_types(&events), vec![SyncEventType::Error]);
    let error = single_error(&events);
    assert_eq!(error.code, SyncErrorCode::UnhandledError);
    assert!(error.fatal);
    assert!(!connector.is_syncing());
}

#[tokio::test]
async fn test_sync_while_syncing_is_rejected_without_disturbing_current_run() {
    let connector = Arc::new(TickingConnector::new(test_context(), true));
    connector.configure(remote_config()).unwrap();

    let running = Arc::clone(&connector).sync();
    let rejected = Arc::clone(&connector).sync();

    assert!(!running.same_stream(&rejected));
    assert!(rejected.is_closed());
    let error = single_error(&collect_events(&rejected).await);
    assert_eq!(error.code, SyncErrorCode::SyncAlreadyStarted);
    assert!(error.fatal);

    assert!(connector.is_syncing());
    assert!(!running.is_closed());
    assert_eq!(running.events()[0].event_type(), SyncEventType::Started);

    connector.stop().await.unwrap();
    assert_eq!(
        collect_events(&running).await.last().map(SyncEvent::event_type),
        Some(SyncEventType::Stopped)
    );
}

#[tokio::test]
async fn test_each_sync_gets_a_fresh_stream() {
    let connector = Arc::new(TickingConnector::new(test_context(), true));
    connector.configure(remote_config()).unwrap();

    let first = Arc::clone(&connector).sync();
    connector.stop().await.unwrap();
    connector.configure(remote_config()).unwrap();
    let second = Arc::clone(&connector).sync();

    assert!(!first.same_stream(&second));
    assert!(first.is_closed());
    assert_eq!(second.events()[0].event_type(), SyncEventType::Started);
    assert_eq!(
        event_types(&second.events())
            .iter()
            .filter(|event_type| **event_type == SyncEventType::Stopped)
            .count(),
        0
    );

    connector.stop().await.unwrap();
}

#[tokio::test]
async fn test_configure_while_syncing_fails() {
    let connector = Arc::new(TickingConnector::new(test_context(), true));
    connector.configure(remote_config()).unwrap();
    let _stream = Arc::clone(&connector).sync();

    let err = connector.configure(remote_config()).unwrap_err();
    assert!(matches!(err, ConnectorError::SyncInProgress { .. }));

    connector.stop().await.unwrap();
    connector.configure(remote_config()).unwrap();
}

#[test]
fn test_configure_rejects_other_connector_kind() {
    let connector = TickingConnector::new(test_context(), true);
    let err = connector
        .configure(ConnectorConfig::new(ConnectorType::FileSystem, ftp_history()))
        .unwrap_err();
    assert!(matches!(err, ConnectorError::InvalidConfig { .. }));
}

#[test]
fn test_configure_rejects_empty_athlete_history() {
    let connector = TickingConnector::new(test_context(), true);
    let err = connector
        .configure(ConnectorConfig::new(
            ConnectorType::RemoteApi,
            AthleteProfileHistory::default(),
        ))
        .unwrap_err();
    assert!(matches!(err, ConnectorError::EmptyAthleteHistory));
    assert!(connector.base().active_config().is_err());
}

#[test]
fn test_configure_normalizes_sync_lower_bound() {
    let connector = TickingConnector::new(test_context(), true);
    let since = Utc.with_ymd_and_hms(2024, 3, 1, 6, 30, 0).unwrap();
    connector
        .configure(remote_config().with_sync_from(since))
        .unwrap();

    let active = connector.base().active_config().unwrap();
    assert_eq!(active.sync_from, Some(since));
    assert_eq!(active.resolver.len(), 2);
    assert!(active.config.enabled);
}

#[test]
fn test_connector_config_deserializes_with_defaults() {
    let config: ConnectorConfig = serde_json::from_value(json!({
        "connector": "REMOTE_API",
        "athlete_profile": {
            "gender": "women",
            "history": [
                { "valid_from": "2020-01-01T00:00:00Z", "settings": { "cycling_ftp": 210.0 } }
            ]
        },
        "sync_from_date_time": 1_704_067_200_000_i64
    }))
    .unwrap();

    assert_eq!(config.connector, ConnectorType::RemoteApi);
    assert_eq!(config.priority, 0);
    assert!(config.enabled);
    assert_eq!(config.sync_from(), Some(utc(2024, 1, 1)));
}

#[test]
fn test_sync_event_wire_format() {
    let value = serde_json::to_value(SyncEvent::started(ConnectorType::FileSystem)).unwrap();
    assert_eq!(value, json!({ "connector": "FILE_SYSTEM", "type": "STARTED" }));
}
