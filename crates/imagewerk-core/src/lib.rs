// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Imagewerk core: types, settings records, and the artifact translation
// layer shared across all crates.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod factory;
pub mod settings;
pub mod types;

pub use artifacts::{ArtifactStore, ImageArtifacts, remove_image_artifacts, set_image_artifacts};
pub use config::EngineConfig;
pub use error::ImagewerkError;
pub use factory::SettingsFactory;
pub use settings::*;
pub use types::*;
