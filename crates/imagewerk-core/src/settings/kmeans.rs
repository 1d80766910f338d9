// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings for k-means colour reduction.

use serde::{Deserialize, Serialize};

use crate::artifacts::{ImageArtifacts, keys};
use crate::types::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KmeansSettings {
    pub number_colors: u32,
    pub max_iterations: u32,
    /// Stop once the relative change in distortion drops below this.
    pub tolerance: f64,
    /// `;`-separated initial colours, e.g. `red;#00F`.
    pub seed_colors: Option<String>,
}

impl Default for KmeansSettings {
    fn default() -> Self {
        Self {
            number_colors: 5,
            max_iterations: 100,
            tolerance: 0.01,
            seed_colors: None,
        }
    }
}

impl KmeansSettings {
    /// Replace the seed colours with `colors`.
    pub fn with_seed_colors(mut self, colors: &[Color]) -> Self {
        let joined: Vec<String> = colors.iter().map(Color::to_string).collect();
        self.seed_colors = Some(joined.join(";"));
        self
    }
}

impl ImageArtifacts for KmeansSettings {
    fn artifacts(&self) -> Vec<(&'static str, String)> {
        match self.seed_colors.as_deref() {
            Some(seeds) if !seeds.is_empty() => {
                vec![(keys::KMEANS_SEED_COLORS, seeds.to_owned())]
            }
            _ => Vec::new(),
        }
    }
}
