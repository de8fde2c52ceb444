// ABOUTME: Uploads activity files that failed to sync to a remote debug collector
// ABOUTME: Identical failure signatures are uploaded once per connector instance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Debug uploads
//!
//! Uploads are fire-and-forget: they run on their own task and every failure
//! is logged, never returned. The returned `JoinHandle` only lets callers
//! (and tests) wait for completion.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use pierre_core::models::ConnectorType;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::json;
use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::context::RuntimeContext;
use crate::identity::truncated_sha256;

/// An activity file that could not be synced
#[derive(Debug, Clone)]
pub struct ActivityInError {
    /// Connector that failed
    pub connector: ConnectorType,
    /// Sport label as known when the failure happened
    pub sport: String,
    /// File format label
    pub file_type: String,
    /// Where in the pipeline it failed (parser, compute, ...)
    pub source: String,
    /// Failure description
    pub reason: String,
    /// File to upload
    pub path: PathBuf,
    /// Activity id, when one was already assigned
    pub activity_id: Option<String>,
}

impl ActivityInError {
    /// JSON document describing the failure signature
    #[must_use]
    pub fn reason_json(&self) -> String {
        json!({
            "source": self.source,
            "reason": self.reason,
            "fileType": self.file_type,
            "sport": self.sport,
        })
        .to_string()
    }
}

/// Per-connector debug uploader with failure signature deduplication
#[derive(Debug)]
pub struct DebugUploader {
    context: Arc<RuntimeContext>,
    seen_reasons: Mutex<HashSet<String>>,
}

impl DebugUploader {
    /// Create an uploader with an empty signature set
    #[must_use]
    pub fn new(context: Arc<RuntimeContext>) -> Self {
        Self {
            context,
            seen_reasons: Mutex::new(HashSet::new()),
        }
    }

    /// Number of distinct failure signatures seen so far
    #[must_use]
    pub fn seen_reasons_count(&self) -> usize {
        self.seen_reasons
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Upload a failing activity file unless the same signature was seen before
    ///
    /// The signature is the digest of `{source, reason, fileType, sport}`.
    /// Returns the upload task handle when an upload was started.
    pub fn upload_activity_in_error(&self, failure: &ActivityInError) -> Option<JoinHandle<()>> {
        let reason_json = failure.reason_json();
        let reason_hash = truncated_sha256(&reason_json);

        let first_seen = self
            .seen_reasons
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reason_hash);
        if !first_seen {
            debug!(
                connector = %failure.connector,
                path = %failure.path.display(),
                "Failure signature already reported, skipping upload"
            );
            return None;
        }

        let sub_path = format!("{}/error", failure.connector.sub_path());
        self.upload_to_connector_debug(
            &sub_path,
            &failure.file_type,
            reason_json,
            &failure.path,
            failure.activity_id.clone(),
        )
    }

    /// Post a file with its metadata to `<endpoint>/connectors/<sub_path>`
    ///
    /// Does nothing (and logs at debug) when debug uploads are disabled.
    pub fn upload_to_connector_debug(
        &self,
        connector_sub_path: &str,
        file_type: &str,
        reason: String,
        path: &Path,
        activity_id: Option<String>,
    ) -> Option<JoinHandle<()>> {
        let debug_files = &self.context.environment().debug_activity_files;
        let endpoint = match (&debug_files.enabled, &debug_files.endpoint) {
            (true, Some(endpoint)) => endpoint,
            _ => {
                debug!(path = %path.display(), "Skip uploading file for debug");
                return None;
            }
        };

        info!(path = %path.display(), "Uploading file for debug");

        let request_url = format!(
            "{}/connectors/{}",
            endpoint.as_str().trim_end_matches('/'),
            connector_sub_path.trim_matches('/')
        );
        let client = self.context.http_client().clone();
        let machine_id = self.context.info().athlete_machine_id.clone();
        let file_type = file_type.to_owned();
        let path = path.to_path_buf();

        Some(tokio::spawn(async move {
            let upload = UploadRequest {
                request_url: &request_url,
                file_type,
                machine_id,
                reason,
                path: &path,
                activity_id,
            };
            match upload.send(&client).await {
                Ok(()) => info!(
                    path = %path.display(),
                    url = %request_url,
                    "Uploaded file for debug"
                ),
                Err(err) => error!(
                    path = %path.display(),
                    url = %request_url,
                    error = %err,
                    "Unable to upload file for debugging purpose"
                ),
            }
        }))
    }
}

struct UploadRequest<'a> {
    request_url: &'a str,
    file_type: String,
    machine_id: String,
    reason: String,
    path: &'a Path,
    activity_id: Option<String>,
}

impl UploadRequest<'_> {
    async fn send(self, client: &Client) -> Result<(), UploadError> {
        let bytes = fs::read(self.path).await?;
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "activity".to_owned(), |name| name.to_string_lossy().into_owned());

        let mut form = Form::new()
            .text("fileType", self.file_type)
            .text("machineId", self.machine_id)
            .text("reason", self.reason)
            .part("file", Part::bytes(bytes).file_name(file_name));
        if let Some(activity_id) = self.activity_id {
            form = form.text("activityId", activity_id);
        }

        client
            .post(self.request_url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
enum UploadError {
    #[error("cannot read file: {0}")]
    Io(#[from] io::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}
