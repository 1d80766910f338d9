// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings for complex-image arithmetic.

use serde::{Deserialize, Serialize};

use crate::artifacts::{ImageArtifacts, keys};
use crate::types::ComplexOperator;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexSettings {
    pub operator: ComplexOperator,
    /// Added to the divisor's squared magnitude by `Divide`.
    pub signal_to_noise_ratio: Option<f64>,
}

impl ComplexSettings {
    pub fn new(operator: ComplexOperator) -> Self {
        Self {
            operator,
            signal_to_noise_ratio: None,
        }
    }
}

impl ImageArtifacts for ComplexSettings {
    fn artifacts(&self) -> Vec<(&'static str, String)> {
        self.signal_to_noise_ratio
            .map(|snr| vec![(keys::COMPLEX_SNR, snr.to_string())])
            .unwrap_or_default()
    }
}
