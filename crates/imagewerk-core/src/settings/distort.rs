// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings for distort.

use serde::{Deserialize, Serialize};

use crate::artifacts::{ImageArtifacts, keys};
use crate::types::Geometry;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortSettings {
    /// Size the output canvas to hold the whole distorted image.
    pub bestfit: bool,
    /// Output resolution multiplier.
    pub scale: Option<f64>,
    /// Explicit output canvas, in distorted coordinates.
    pub viewport: Option<Geometry>,
}

impl ImageArtifacts for DistortSettings {
    fn artifacts(&self) -> Vec<(&'static str, String)> {
        let mut artifacts = Vec::new();
        if let Some(scale) = self.scale {
            artifacts.push((keys::DISTORT_SCALE, scale.to_string()));
        }
        if let Some(viewport) = self.viewport {
            artifacts.push((keys::DISTORT_VIEWPORT, viewport.to_string()));
        }
        artifacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bestfit_is_not_an_artifact() {
        let settings = DistortSettings {
            bestfit: true,
            ..DistortSettings::default()
        };
        assert!(settings.artifacts().is_empty());
    }

    #[test]
    fn scale_and_viewport_are_formatted() {
        let settings = DistortSettings {
            bestfit: false,
            scale: Some(1.5),
            viewport: Some(Geometry::with_offset(40, 30, -10, 5)),
        };
        assert_eq!(
            settings.artifacts(),
            vec![
                (keys::DISTORT_SCALE, "1.5".to_owned()),
                (keys::DISTORT_VIEWPORT, "40x30-10+5".to_owned()),
            ]
        );
    }
}
