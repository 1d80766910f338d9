// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel filters: mean-shift smoothing, k-means colour reduction, and
// morphology / convolution.

pub mod kmeans;
pub mod mean_shift;
pub mod morphology;
