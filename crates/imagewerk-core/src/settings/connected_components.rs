// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings for connected-components labelling.

use serde::{Deserialize, Serialize};

use crate::artifacts::{ImageArtifacts, keys};
use crate::types::{Connectivity, Threshold};

/// Labelling connectivity plus the per-shape filters. A component survives
/// only if it falls inside every threshold that is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectedComponentsSettings {
    pub connectivity: Connectivity,
    /// Orientation of the major axis, in degrees.
    pub angle_threshold: Option<Threshold>,
    /// Pixel count.
    pub area_threshold: Option<Threshold>,
    pub circularity_threshold: Option<Threshold>,
    /// Diameter of the circle with the same area.
    pub diameter_threshold: Option<Threshold>,
    pub eccentricity_threshold: Option<Threshold>,
    pub major_axis_threshold: Option<Threshold>,
    /// Paint each surviving component with its mean colour.
    pub mean_color: bool,
    pub minor_axis_threshold: Option<Threshold>,
    pub perimeter_threshold: Option<Threshold>,
}

impl ConnectedComponentsSettings {
    pub fn new(connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            ..Self::default()
        }
    }
}

impl ImageArtifacts for ConnectedComponentsSettings {
    fn artifacts(&self) -> Vec<(&'static str, String)> {
        let thresholds = [
            (keys::CC_ANGLE_THRESHOLD, self.angle_threshold),
            (keys::CC_AREA_THRESHOLD, self.area_threshold),
            (keys::CC_CIRCULARITY_THRESHOLD, self.circularity_threshold),
            (keys::CC_DIAMETER_THRESHOLD, self.diameter_threshold),
            (keys::CC_ECCENTRICITY_THRESHOLD, self.eccentricity_threshold),
            (keys::CC_MAJOR_AXIS_THRESHOLD, self.major_axis_threshold),
        ];

        let mut artifacts: Vec<(&'static str, String)> = thresholds
            .into_iter()
            .filter_map(|(key, threshold)| threshold.map(|t| (key, t.to_string())))
            .collect();

        if self.mean_color {
            artifacts.push((keys::CC_MEAN_COLOR, "true".to_owned()));
        }
        if let Some(threshold) = self.minor_axis_threshold {
            artifacts.push((keys::CC_MINOR_AXIS_THRESHOLD, threshold.to_string()));
        }
        if let Some(threshold) = self.perimeter_threshold {
            artifacts.push((keys::CC_PERIMETER_THRESHOLD, threshold.to_string()));
        }
        artifacts
    }
}
