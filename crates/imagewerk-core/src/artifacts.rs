// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact translation layer.
//
// Settings records are mapped onto string-keyed artifacts on an image before
// an engine operation runs, and the same keys are removed afterwards. Only
// fields that carry a value produce (or remove) an artifact.

use std::collections::BTreeMap;

use tracing::debug;

/// Fixed artifact key names read by the engine.
pub mod keys {
    pub const COMPARE_HIGHLIGHT_COLOR: &str = "compare:highlight-color";
    pub const COMPARE_LOWLIGHT_COLOR: &str = "compare:lowlight-color";
    pub const COMPARE_MASKLIGHT_COLOR: &str = "compare:masklight-color";

    pub const COMPLEX_SNR: &str = "complex:snr";

    pub const CC_ANGLE_THRESHOLD: &str = "connected-components:angle-threshold";
    pub const CC_AREA_THRESHOLD: &str = "connected-components:area-threshold";
    pub const CC_CIRCULARITY_THRESHOLD: &str = "connected-components:circularity-threshold";
    pub const CC_DIAMETER_THRESHOLD: &str = "connected-components:diameter-threshold";
    pub const CC_ECCENTRICITY_THRESHOLD: &str = "connected-components:eccentricity-threshold";
    pub const CC_MAJOR_AXIS_THRESHOLD: &str = "connected-components:major-axis-threshold";
    pub const CC_MEAN_COLOR: &str = "connected-components:mean-color";
    pub const CC_MINOR_AXIS_THRESHOLD: &str = "connected-components:minor-axis-threshold";
    pub const CC_PERIMETER_THRESHOLD: &str = "connected-components:perimeter-threshold";

    pub const DESKEW_AUTO_CROP: &str = "deskew:auto-crop";

    pub const DISTORT_SCALE: &str = "distort:scale";
    pub const DISTORT_VIEWPORT: &str = "distort:viewport";

    pub const KMEANS_SEED_COLORS: &str = "kmeans:seed-colors";

    pub const CONVOLVE_BIAS: &str = "convolve:bias";
    pub const CONVOLVE_SCALE: &str = "convolve:scale";
}

/// A string-keyed property table attached to an image.
pub trait ArtifactStore {
    /// Set `key` to `value`, replacing any previous value.
    fn set_artifact(&mut self, key: &str, value: &str);

    /// Remove `key`. Removing an absent key is a no-op.
    fn remove_artifact(&mut self, key: &str);

    /// Current value of `key`, if set.
    fn artifact(&self, key: &str) -> Option<&str>;
}

impl ArtifactStore for BTreeMap<String, String> {
    fn set_artifact(&mut self, key: &str, value: &str) {
        self.insert(key.to_owned(), value.to_owned());
    }

    fn remove_artifact(&mut self, key: &str) {
        self.remove(key);
    }

    fn artifact(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// A settings record that carries artifacts.
pub trait ImageArtifacts {
    /// `(key, formatted value)` for every field that carries a value.
    fn artifacts(&self) -> Vec<(&'static str, String)>;

    /// Keys of the fields that carry a value.
    fn artifact_keys(&self) -> Vec<&'static str> {
        self.artifacts().into_iter().map(|(key, _)| key).collect()
    }
}

/// Write the artifacts carried by `settings` onto `image`.
pub fn set_image_artifacts<A, S>(image: &mut A, settings: &S)
where
    A: ArtifactStore + ?Sized,
    S: ImageArtifacts + ?Sized,
{
    for (key, value) in settings.artifacts() {
        debug!(key, value = %value, "Setting artifact");
        image.set_artifact(key, &value);
    }
}

/// Remove every artifact that `set_image_artifacts` would have written for
/// `settings`.
pub fn remove_image_artifacts<A, S>(image: &mut A, settings: &S)
where
    A: ArtifactStore + ?Sized,
    S: ImageArtifacts + ?Sized,
{
    for key in settings.artifact_keys() {
        debug!(key, "Removing artifact");
        image.remove_artifact(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<(&'static str, String)>);

    impl ImageArtifacts for Fixed {
        fn artifacts(&self) -> Vec<(&'static str, String)> {
            self.0.clone()
        }
    }

    #[test]
    fn set_then_remove_restores_table() {
        let mut table = BTreeMap::new();
        table.set_artifact("unrelated", "keep");
        let before = table.clone();

        let settings = Fixed(vec![
            (keys::DISTORT_SCALE, "2".into()),
            (keys::DISTORT_VIEWPORT, "10x10+0+0".into()),
        ]);
        set_image_artifacts(&mut table, &settings);
        assert_eq!(table.artifact(keys::DISTORT_SCALE), Some("2"));
        assert_eq!(table.artifact(keys::DISTORT_VIEWPORT), Some("10x10+0+0"));

        remove_image_artifacts(&mut table, &settings);
        assert_eq!(table, before);
    }

    #[test]
    fn remove_only_touches_present_fields() {
        let mut table = BTreeMap::new();
        table.set_artifact(keys::CONVOLVE_BIAS, "set by caller");

        remove_image_artifacts(&mut table, &Fixed(vec![]));
        assert_eq!(table.artifact(keys::CONVOLVE_BIAS), Some("set by caller"));
    }

    #[test]
    fn set_overwrites_existing_value() {
        let mut table = BTreeMap::new();
        table.set_artifact(keys::COMPLEX_SNR, "1");
        set_image_artifacts(&mut table, &Fixed(vec![(keys::COMPLEX_SNR, "0.5".into())]));
        assert_eq!(table.artifact(keys::COMPLEX_SNR), Some("0.5"));
    }
}
