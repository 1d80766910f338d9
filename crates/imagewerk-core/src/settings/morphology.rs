// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings for morphology and convolution.

use serde::{Deserialize, Serialize};

use crate::artifacts::{ImageArtifacts, keys};
use crate::types::{ConvolveScale, Kernel, MorphologyMethod, Percentage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologySettings {
    pub method: MorphologyMethod,
    pub kernel: Kernel,
    pub iterations: u32,
    /// Added to every convolution result, as a percentage of full range.
    pub convolve_bias: Option<Percentage>,
    pub convolve_scale: Option<ConvolveScale>,
}

impl Default for MorphologySettings {
    fn default() -> Self {
        Self {
            method: MorphologyMethod::Convolve,
            kernel: Kernel::Unity,
            iterations: 1,
            convolve_bias: None,
            convolve_scale: None,
        }
    }
}

impl MorphologySettings {
    pub fn new(method: MorphologyMethod, kernel: Kernel) -> Self {
        Self {
            method,
            kernel,
            ..Self::default()
        }
    }
}

impl ImageArtifacts for MorphologySettings {
    fn artifacts(&self) -> Vec<(&'static str, String)> {
        let mut artifacts = Vec::new();
        if let Some(bias) = self.convolve_bias {
            artifacts.push((keys::CONVOLVE_BIAS, bias.to_string()));
        }
        if let Some(scale) = self.convolve_scale {
            artifacts.push((keys::CONVOLVE_SCALE, scale.to_string()));
        }
        artifacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bias_and_scale_are_formatted() {
        let settings = MorphologySettings {
            convolve_bias: Some(Percentage::new(50.0)),
            convolve_scale: Some(ConvolveScale::normalized(2.0)),
            ..MorphologySettings::new(MorphologyMethod::Convolve, Kernel::Square { radius: 1 })
        };
        assert_eq!(
            settings.artifacts(),
            vec![
                (keys::CONVOLVE_BIAS, "50%".to_owned()),
                (keys::CONVOLVE_SCALE, "2!".to_owned()),
            ]
        );
    }

    #[test]
    fn kernel_deserializes_from_tagged_json() {
        let settings: MorphologySettings = serde_json::from_str(
            r#"{"method":"dilate","kernel":{"type":"diamond","radius":2},"iterations":3}"#,
        )
        .unwrap();
        assert_eq!(settings.method, MorphologyMethod::Dilate);
        assert_eq!(settings.kernel, Kernel::Diamond { radius: 2 });
        assert_eq!(settings.iterations, 3);
        assert!(settings.artifacts().is_empty());
    }
}
