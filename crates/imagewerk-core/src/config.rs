// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::types::Percentage;

/// Tuning knobs shared by every engine operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Colour distance under which two pixels count as equal in `compare`.
    pub fuzz: Percentage,
    /// Upper bound on mean-shift iterations per pixel.
    pub mean_shift_max_iterations: u32,
    /// Largest skew angle (degrees, either direction) that deskew searches.
    pub deskew_max_angle: f64,
    /// Number of pixels sampled when k-means needs extra seed colours.
    pub kmeans_sample_limit: usize,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fuzz: Percentage::new(0.0),
            mean_shift_max_iterations: 100,
            deskew_max_angle: 10.0,
            kmeans_sample_limit: 4096,
            log_filter: "info".to_owned(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&text)?;
        info!(path = %path.as_ref().display(), "Engine configuration loaded");
        Ok(config)
    }
}
