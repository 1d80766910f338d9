// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings for deskew.

use serde::{Deserialize, Serialize};

use crate::artifacts::{ImageArtifacts, keys};
use crate::types::Percentage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskewSettings {
    /// Crop away the corners exposed by the corrective rotation.
    pub auto_crop: bool,
    /// Pixels darker than this fraction of full intensity count as text.
    pub threshold: Percentage,
}

impl Default for DeskewSettings {
    fn default() -> Self {
        Self {
            auto_crop: false,
            threshold: Percentage::new(40.0),
        }
    }
}

impl ImageArtifacts for DeskewSettings {
    fn artifacts(&self) -> Vec<(&'static str, String)> {
        if self.auto_crop {
            vec![(keys::DESKEW_AUTO_CROP, "true".to_owned())]
        } else {
            Vec::new()
        }
    }
}
