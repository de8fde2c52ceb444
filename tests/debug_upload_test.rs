// ABOUTME: Tests for debug uploads of activity files that failed to sync
// ABOUTME: Uses a wiremock collector to check multipart posts and signature deduplication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use common::{
    collect_events, context_with, ftp_history, single_error, test_context, test_runtime_info,
    ScriptedWorker,
};
use pierre_activity_sync::config::{DebugActivityFilesConfig, SyncEnvironment};
use pierre_activity_sync::connectors::{
    Connector, ConnectorConfig, FileSystemConnector, FileSystemSource,
};
use pierre_activity_sync::debug_upload::{ActivityInError, DebugUploader};
use pierre_activity_sync::store::InMemoryActivityStore;
use pierre_core::errors::SyncErrorCode;
use pierre_core::models::ConnectorType;
use tempfile::TempDir;
use tokio::time;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn enabled_environment(server: &MockServer) -> SyncEnvironment {
    SyncEnvironment {
        debug_activity_files: DebugActivityFilesConfig::enabled(
            Url::parse(&server.uri()).unwrap(),
        ),
        ..SyncEnvironment::default()
    }
}

fn parse_failure(path: &Path, reason: &str) -> ActivityInError {
    ActivityInError {
        connector: ConnectorType::FileSystem,
        sport: "unknown".into(),
        file_type: "json".into(),
        source: "parser".into(),
        reason: reason.into(),
        path: path.to_path_buf(),
        activity_id: None,
    }
}

fn broken_file(dir: &TempDir) -> PathBuf {
    let file = dir.path().join("broken.json");
    fs::write(&file, b"{ not json").unwrap();
    file
}

async fn mount_collector(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/connectors/file_system/error"))
        .respond_with(ResponseTemplate::new(200))
        .expect(expected)
        .mount(server)
        .await;
}

async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<Request> {
    for _ in 0..100 {
        let received = server.received_requests().await.unwrap_or_default();
        if received.len() >= count {
            return received;
        }
        time::sleep(Duration::from_millis(20)).await;
    }
    panic!("collector did not receive {count} requests");
}

#[tokio::test]
async fn test_failure_is_posted_as_multipart_once() {
    let server = MockServer::start().await;
    mount_collector(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let file = broken_file(&dir);
    let uploader = DebugUploader::new(context_with(enabled_environment(&server)));

    let first = uploader.upload_activity_in_error(&parse_failure(&file, "expected value"));
    let second = uploader.upload_activity_in_error(&parse_failure(&file, "expected value"));

    assert!(second.is_none());
    first.unwrap().await.unwrap();
    assert_eq!(uploader.seen_reasons_count(), 1);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"machineId\""));
    assert!(body.contains(&test_runtime_info().athlete_machine_id));
    assert!(body.contains("name=\"fileType\""));
    assert!(body.contains("filename=\"broken.json\""));
    assert!(body.contains("{ not json"));
    assert!(!body.contains("name=\"activityId\""));
}

#[tokio::test]
async fn test_distinct_reasons_are_each_uploaded() {
    let server = MockServer::start().await;
    mount_collector(&server, 2).await;
    let dir = TempDir::new().unwrap();
    let file = broken_file(&dir);
    let uploader = DebugUploader::new(context_with(enabled_environment(&server)));

    let handles = [
        uploader.upload_activity_in_error(&parse_failure(&file, "expected value")),
        uploader.upload_activity_in_error(&parse_failure(&file, "trailing comma")),
    ];

    for handle in handles {
        handle.unwrap().await.unwrap();
    }
    assert_eq!(uploader.seen_reasons_count(), 2);
}

#[tokio::test]
async fn test_activity_id_is_sent_when_known() {
    let server = MockServer::start().await;
    mount_collector(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let file = broken_file(&dir);
    let uploader = DebugUploader::new(context_with(enabled_environment(&server)));
    let failure = ActivityInError {
        source: "compute".into(),
        activity_id: Some("65f0c0ffee00000000000001".into()),
        ..parse_failure(&file, "worker rejected")
    };

    uploader
        .upload_activity_in_error(&failure)
        .unwrap()
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"activityId\""));
    assert!(body.contains("65f0c0ffee00000000000001"));
}

#[tokio::test]
async fn test_disabled_uploads_do_nothing() {
    let dir = TempDir::new().unwrap();
    let file = broken_file(&dir);
    let uploader = DebugUploader::new(test_context());

    let handle = uploader.upload_activity_in_error(&parse_failure(&file, "expected value"));

    assert!(handle.is_none());
}

#[tokio::test]
async fn test_collector_failure_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let file = broken_file(&dir);
    let uploader = DebugUploader::new(context_with(enabled_environment(&server)));

    let handle = uploader.upload_activity_in_error(&parse_failure(&file, "expected value"));

    // The task logs the failure and completes normally
    handle.unwrap().await.unwrap();
}

#[tokio::test]
async fn test_unreadable_file_does_not_panic() {
    let server = MockServer::start().await;
    mount_collector(&server, 0).await;
    let dir = TempDir::new().unwrap();
    let uploader = DebugUploader::new(context_with(enabled_environment(&server)));

    let handle = uploader
        .upload_activity_in_error(&parse_failure(&dir.path().join("gone.json"), "missing"));

    handle.unwrap().await.unwrap();
}

#[tokio::test]
async fn test_connector_uploads_unparsable_files() {
    let server = MockServer::start().await;
    mount_collector(&server, 1).await;
    let dir = TempDir::new().unwrap();
    broken_file(&dir);
    let connector = Arc::new(FileSystemConnector::new(
        context_with(enabled_environment(&server)),
        Arc::new(InMemoryActivityStore::new()),
        Arc::new(ScriptedWorker::default()),
        FileSystemSource::new(dir.path()),
    ));
    connector
        .configure(ConnectorConfig::new(ConnectorType::FileSystem, ftp_history()))
        .unwrap();

    let events = collect_events(&Arc::clone(&connector).sync()).await;
    assert_eq!(single_error(&events).code, SyncErrorCode::ParseError);

    let requests = wait_for_requests(&server, 1).await;
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("\"source\":\"parser\""));

    // Same failure on the next run is not uploaded again
    connector
        .configure(ConnectorConfig::new(ConnectorType::FileSystem, ftp_history()))
        .unwrap();
    collect_events(&Arc::clone(&connector).sync()).await;
    assert_eq!(connector.base().uploader().seen_reasons_count(), 1);
}
