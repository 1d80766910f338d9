// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// imagewerk-image: the image engine behind Imagewerk's settings records.
//
// Every operation lives on `ImageHandle`. Settings records from
// `imagewerk-core` are written into the handle's artifact table for the
// duration of an operation, and the operation reads its tuning parameters
// back out of that table.

pub mod compare;
pub mod complex;
pub mod connected_components;
pub mod filters;
pub mod handle;
pub mod transform;

// Re-export the primary types so callers can use `imagewerk_image::ImageHandle` etc.
pub use compare::CompareResult;
pub use complex::complex;
pub use connected_components::ConnectedComponent;
pub use handle::ImageHandle;
