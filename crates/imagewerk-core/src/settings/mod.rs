// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings records consumed by engine operations. Each record maps its
// optional fields onto artifacts via `ImageArtifacts`; a field without a value
// never produces an artifact.

pub mod compare;
pub mod complex;
pub mod connected_components;
pub mod deskew;
pub mod distort;
pub mod kmeans;
pub mod morphology;

pub use compare::CompareSettings;
pub use complex::ComplexSettings;
pub use connected_components::ConnectedComponentsSettings;
pub use deskew::DeskewSettings;
pub use distort::DistortSettings;
pub use kmeans::KmeansSettings;
pub use morphology::MorphologySettings;
