// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Factory for default settings records.

use crate::settings::{
    CompareSettings, ComplexSettings, ConnectedComponentsSettings, DeskewSettings,
    DistortSettings, KmeansSettings, MorphologySettings,
};

/// Creates settings records with their default values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsFactory;

impl SettingsFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn create_compare_settings(&self) -> CompareSettings {
        CompareSettings::default()
    }

    pub fn create_complex_settings(&self) -> ComplexSettings {
        ComplexSettings::default()
    }

    pub fn create_connected_components_settings(&self) -> ConnectedComponentsSettings {
        ConnectedComponentsSettings::default()
    }

    pub fn create_deskew_settings(&self) -> DeskewSettings {
        DeskewSettings::default()
    }

    pub fn create_distort_settings(&self) -> DistortSettings {
        DistortSettings::default()
    }

    pub fn create_kmeans_settings(&self) -> KmeansSettings {
        KmeansSettings::default()
    }

    pub fn create_morphology_settings(&self) -> MorphologySettings {
        MorphologySettings::default()
    }
}

#[cfg(test)]
mod tests {
    use std::any::{Any, TypeId};

    use super::*;
    use crate::artifacts::ImageArtifacts;
    use crate::types::{ErrorMetric, Percentage};

    #[test]
    fn creates_compare_settings_instance() {
        let factory = SettingsFactory::new();

        let settings = factory.create_compare_settings();

        assert_eq!(settings.type_id(), TypeId::of::<CompareSettings>());
        assert_eq!(settings.metric, ErrorMetric::RootMeanSquared);
    }

    #[test]
    fn created_settings_carry_no_artifacts() {
        let factory = SettingsFactory::new();
        assert!(factory.create_compare_settings().artifacts().is_empty());
        assert!(factory.create_complex_settings().artifacts().is_empty());
        assert!(factory.create_connected_components_settings().artifacts().is_empty());
        assert!(factory.create_deskew_settings().artifacts().is_empty());
        assert!(factory.create_distort_settings().artifacts().is_empty());
        assert!(factory.create_kmeans_settings().artifacts().is_empty());
        assert!(factory.create_morphology_settings().artifacts().is_empty());
    }

    #[test]
    fn created_settings_use_documented_defaults() {
        let factory = SettingsFactory::new();
        assert_eq!(factory.create_deskew_settings().threshold, Percentage::new(40.0));
        assert_eq!(factory.create_kmeans_settings().number_colors, 5);
        assert_eq!(factory.create_morphology_settings().iterations, 1);
    }
}
