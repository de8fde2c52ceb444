// ABOUTME: Runtime context holding host info, sync environment and the shared HTTP client
// ABOUTME: Machine ids are derived once and reused by debug uploads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fs;
use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::SyncEnvironment;

/// Files holding a stable machine identifier, probed in order
const MACHINE_ID_FILES: [&str; 2] = ["/etc/machine-id", "/var/lib/dbus/machine-id"];

/// Host information gathered at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeInfo {
    /// Operating system
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// Host name
    pub hostname: String,
    /// Current user name
    pub username: String,
    /// Stable machine identifier
    pub machine_id: String,
    /// sha256 of `machine_id:username`
    pub athlete_machine_id: String,
    /// Available CPU threads
    pub cpu_threads: usize,
}

impl RuntimeInfo {
    /// Gather host information from the running system
    #[must_use]
    pub fn detect() -> Self {
        let hostname = env::var("HOSTNAME")
            .or_else(|_| env::var("COMPUTERNAME"))
            .or_else(|_| fs::read_to_string("/etc/hostname").map(|name| name.trim().to_owned()))
            .unwrap_or_else(|_| "unknown".to_owned());
        let username = env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_owned());
        let machine_id = read_machine_id().unwrap_or_else(|| {
            warn!("No machine id file found, deriving one from the host name");
            sha256_hex(&hostname)
        });
        let cpu_threads = thread::available_parallelism().map_or(1, NonZeroUsize::get);

        Self::new(
            env::consts::OS,
            env::consts::ARCH,
            hostname,
            username,
            machine_id,
            cpu_threads,
        )
    }

    /// Build host information from explicit values
    #[must_use]
    pub fn new(
        os: impl Into<String>,
        arch: impl Into<String>,
        hostname: impl Into<String>,
        username: impl Into<String>,
        machine_id: impl Into<String>,
        cpu_threads: usize,
    ) -> Self {
        let username = username.into();
        let machine_id = machine_id.into();
        let athlete_machine_id = sha256_hex(&format!("{machine_id}:{username}"));
        Self {
            os: os.into(),
            arch: arch.into(),
            hostname: hostname.into(),
            username,
            machine_id,
            athlete_machine_id,
            cpu_threads,
        }
    }

    /// One-line description for logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}/{} host={} user={} threads={}",
            self.os, self.arch, self.hostname, self.username, self.cpu_threads
        )
    }
}

fn read_machine_id() -> Option<String> {
    MACHINE_ID_FILES.iter().find_map(|path| {
        fs::read_to_string(path)
            .ok()
            .map(|raw| raw.trim().to_owned())
            .filter(|id| !id.is_empty())
    })
}

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Dependencies shared by every connector of the process
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    info: RuntimeInfo,
    environment: SyncEnvironment,
    http_client: Client,
}

impl RuntimeContext {
    /// Create the context, building the HTTP client from the environment timeouts
    #[must_use]
    pub fn new(info: RuntimeInfo, environment: SyncEnvironment) -> Self {
        let http_client = ClientBuilder::new()
            .timeout(Duration::from_secs(environment.http.request_secs))
            .connect_timeout(Duration::from_secs(environment.http.connect_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        debug!(runtime = %info.summary(), "Runtime context created");
        Self {
            info,
            environment,
            http_client,
        }
    }

    /// Detect host information and pair it with `environment`
    #[must_use]
    pub fn detect(environment: SyncEnvironment) -> Self {
        Self::new(RuntimeInfo::detect(), environment)
    }

    /// Get host information
    #[must_use]
    pub const fn info(&self) -> &RuntimeInfo {
        &self.info
    }

    /// Get sync environment configuration
    #[must_use]
    pub const fn environment(&self) -> &SyncEnvironment {
        &self.environment
    }

    /// Get shared HTTP client
    #[must_use]
    pub const fn http_client(&self) -> &Client {
        &self.http_client
    }
}
