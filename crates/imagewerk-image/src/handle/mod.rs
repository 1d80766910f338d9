// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handle module: the artifact-carrying image and its pixel sampling helpers.

pub mod image_handle;
pub(crate) mod sampling;

pub use image_handle::ImageHandle;
