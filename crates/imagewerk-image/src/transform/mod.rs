// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometric transforms. Both resample through `handle::sampling::warp_onto`.

pub mod deskew;
pub mod distort;
