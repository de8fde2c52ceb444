// ABOUTME: Recorded activity streams (time, distance, speed, altitude, heart rate, power, GPS)
// ABOUTME: Deflate/inflate codec used when streams travel to storage or back from it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::errors::StreamsCodecError;

/// Sample-aligned streams of an activity
///
/// Every non-empty stream has one sample per entry of `time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Streams {
    /// Seconds since activity start
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub time: Vec<f64>,
    /// Cumulated distance (m)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub distance: Vec<f64>,
    /// Smoothed speed (m/s)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub velocity_smooth: Vec<f64>,
    /// Altitude (m)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub altitude: Vec<f64>,
    /// Heart rate (bpm)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub heartrate: Vec<f64>,
    /// Cadence (rpm or spm)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cadence: Vec<f64>,
    /// Power (watts)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub watts: Vec<f64>,
    /// Smoothed grade (%)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub grade_smooth: Vec<f64>,
    /// GPS positions as `[lat, lng]`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub latlng: Vec<[f64; 2]>,
}

impl Streams {
    /// Tell whether positional (GPS) samples are present
    #[must_use]
    pub fn has_positions(&self) -> bool {
        !self.latlng.is_empty()
    }

    /// Compress streams into a base64 string of zlib-deflated JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or compression fails
    pub fn deflate(&self) -> Result<String, StreamsCodecError> {
        let json = serde_json::to_vec(self)?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;
        Ok(STANDARD.encode(compressed))
    }

    /// Restore streams produced by [`Streams::deflate`]
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid base64, not zlib data, or
    /// not a streams document
    pub fn inflate(deflated: &str) -> Result<Self, StreamsCodecError> {
        let compressed = STANDARD.decode(deflated.trim())?;
        let mut json = Vec::new();
        ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut json)?;
        Ok(serde_json::from_slice(&json)?)
    }
}

/// Deflated streams as kept by the local activity store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeflatedActivityStreams {
    /// Activity the streams belong to
    pub activity_id: String,
    /// Output of [`Streams::deflate`]
    pub deflated_streams: String,
}
