// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resampling shared by the geometric transforms, on top of
// `imageproc::geometric_transformations::warp_into`.
//
// Transforms are expressed in continuous coordinates, where pixel (i, j)
// covers [i, i+1) x [j, j+1) and has its centre at (i + 0.5, j + 0.5).

use image::{ImageBuffer, Rgba, Rgba32FImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

/// Render `source` through `forward` (source to output, continuous
/// coordinates) onto a `width` x `height` canvas with bilinear
/// interpolation. Output pixels whose pre-image lies outside the source are
/// transparent.
pub(crate) fn warp_onto(
    source: &Rgba32FImage,
    forward: Projection,
    width: u32,
    height: u32,
) -> Rgba32FImage {
    let mut output = Rgba32FImage::new(width, height);
    if source.width() == 0 || source.height() == 0 {
        return output;
    }

    // The bilinear sampler needs a right and bottom neighbour for every
    // sample, so the source gets a one-pixel frame holding the edge colour
    // at zero alpha. Padded index p maps to continuous source position p - 0.5.
    let padded = with_transparent_frame(source);
    let forward = Projection::translate(-0.5, -0.5)
        .and_then(forward)
        .and_then(Projection::translate(-0.5, -0.5));

    warp_into(
        &padded,
        &forward,
        Interpolation::Bilinear,
        Rgba([0.0; 4]),
        &mut output,
    );
    output
}

fn with_transparent_frame(source: &Rgba32FImage) -> Rgba32FImage {
    let (width, height) = source.dimensions();
    ImageBuffer::from_fn(width + 2, height + 2, |x, y| {
        let sx = x.saturating_sub(1).min(width - 1);
        let sy = y.saturating_sub(1).min(height - 1);
        let mut pixel = source.get_pixel(sx, sy).0;
        if x == 0 || y == 0 || x > width || y > height {
            pixel[3] = 0.0;
        }
        Rgba(pixel)
    })
}

// -- Tests --------------------------------------------------------------------
