// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings for image comparison.

use serde::{Deserialize, Serialize};

use crate::artifacts::{ImageArtifacts, keys};
use crate::types::{Color, ErrorMetric};

/// Settings for `compare`: the metric, and the colours used to paint the
/// difference image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareSettings {
    /// Distortion metric to compute.
    pub metric: ErrorMetric,
    /// Colour painted over pixels that differ.
    pub highlight_color: Option<Color>,
    /// Colour painted over pixels that match.
    pub lowlight_color: Option<Color>,
    /// Colour painted over pixels outside the read mask.
    pub masklight_color: Option<Color>,
}

impl CompareSettings {
    pub fn new(metric: ErrorMetric) -> Self {
        Self {
            metric,
            ..Self::default()
        }
    }
}

impl ImageArtifacts for CompareSettings {
    fn artifacts(&self) -> Vec<(&'static str, String)> {
        let mut artifacts = Vec::new();
        if let Some(color) = self.highlight_color {
            artifacts.push((keys::COMPARE_HIGHLIGHT_COLOR, color.to_string()));
        }
        if let Some(color) = self.lowlight_color {
            artifacts.push((keys::COMPARE_LOWLIGHT_COLOR, color.to_string()));
        }
        if let Some(color) = self.masklight_color {
            artifacts.push((keys::COMPARE_MASKLIGHT_COLOR, color.to_string()));
        }
        artifacts
    }
}
