// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Morphology and convolution with a user-supplied kernel.
//
// Convolution reads `convolve:scale` and `convolve:bias` from the artifact
// table. The kernel is applied as a correlation (not mirrored) with edge
// pixels extended past the border. Alpha is carried through unchanged.

use image::{ImageBuffer, Rgba, Rgba32FImage};
use imagewerk_core::artifacts::keys;
use imagewerk_core::error::Result;
use imagewerk_core::{ConvolveScale, Kernel, MorphologyMethod, MorphologySettings, Percentage};
use tracing::{debug, info, instrument};

use crate::handle::ImageHandle;

/// A kernel flattened for the inner loops.
struct KernelCells {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

impl ImageHandle {
    /// Apply `settings.method` with `settings.kernel`, `settings.iterations`
    /// times.
    #[instrument(skip_all, fields(method = ?settings.method, kernel = %settings.kernel))]
    pub fn morphology(&mut self, settings: &MorphologySettings) -> Result<()> {
        let kernel = kernel_cells(&settings.kernel)?;
        info!(iterations = settings.iterations, "Applying morphology");
        self.with_artifacts(settings, |image| {
            image.apply_morphology(settings.method, &kernel, settings.iterations)
        })
    }

    fn apply_morphology(
        &mut self,
        method: MorphologyMethod,
        kernel: &KernelCells,
        iterations: u32,
    ) -> Result<()> {
        let step: Box<dyn Fn(&Rgba32FImage) -> Rgba32FImage + '_> = match method {
            MorphologyMethod::Convolve => {
                let (weights, bias) = self.convolution_kernel(kernel)?;
                Box::new(move |source: &Rgba32FImage| convolve(source, &weights, bias))
            }
            MorphologyMethod::Erode => {
                Box::new(|source: &Rgba32FImage| extreme(source, kernel, Extreme::Min))
            }
            MorphologyMethod::Dilate => {
                Box::new(|source: &Rgba32FImage| extreme(source, kernel, Extreme::Max))
            }
            MorphologyMethod::Open => Box::new(|source: &Rgba32FImage| {
                extreme(&extreme(source, kernel, Extreme::Min), kernel, Extreme::Max)
            }),
            MorphologyMethod::Close => Box::new(|source: &Rgba32FImage| {
                extreme(&extreme(source, kernel, Extreme::Max), kernel, Extreme::Min)
            }),
        };

        for _ in 0..iterations {
            let next = step(self.pixels());
            self.replace_pixels(next);
        }
        Ok(())
    }

    /// The kernel after `convolve:scale`, plus the `convolve:bias` offset as
    /// a fraction of full range.
    fn convolution_kernel(&self, kernel: &KernelCells) -> Result<(KernelCells, f64)> {
        let scale = self
            .parse_artifact::<ConvolveScale>(keys::CONVOLVE_SCALE)?
            .unwrap_or(ConvolveScale::new(1.0));
        let bias = self
            .parse_artifact::<Percentage>(keys::CONVOLVE_BIAS)?
            .map(|bias| bias.fraction())
            .unwrap_or(0.0);

        let mut values = kernel.values.clone();
        if scale.normalize {
            let sum: f64 = values.iter().sum();
            if sum.abs() > f64::EPSILON {
                values.iter_mut().for_each(|v| *v /= sum);
            }
        }
        values.iter_mut().for_each(|v| *v *= scale.factor);
        debug!(factor = scale.factor, normalize = scale.normalize, bias, "Convolution parameters");

        Ok((
            KernelCells {
                width: kernel.width,
                height: kernel.height,
                values,
            },
            bias,
        ))
    }
}

fn kernel_cells(kernel: &Kernel) -> Result<KernelCells> {
    kernel.validate()?;
    let (width, height) = kernel.dimensions();
    let values = kernel.values();
    Ok(KernelCells {
        width,
        height,
        values,
    })
}

/// Visit every kernel cell around (`x`, `y`) with the source pixel under it.
fn for_each_cell(
    source: &Rgba32FImage,
    kernel: &KernelCells,
    x: u32,
    y: u32,
    mut visit: impl FnMut(f64, &[f32; 4]),
) {
    let max_x = source.width() as i64 - 1;
    let max_y = source.height() as i64 - 1;
    let origin_x = (kernel.width / 2) as i64;
    let origin_y = (kernel.height / 2) as i64;

    for ky in 0..kernel.height as i64 {
        for kx in 0..kernel.width as i64 {
            let value = kernel.values[(ky * kernel.width as i64 + kx) as usize];
            let sx = (x as i64 + kx - origin_x).clamp(0, max_x);
            let sy = (y as i64 + ky - origin_y).clamp(0, max_y);
            visit(value, &source.get_pixel(sx as u32, sy as u32).0);
        }
    }
}

fn convolve(source: &Rgba32FImage, kernel: &KernelCells, bias: f64) -> Rgba32FImage {
    ImageBuffer::from_fn(source.width(), source.height(), |x, y| {
        let mut sum = [0.0f64; 3];
        for_each_cell(source, kernel, x, y, |value, pixel| {
            for c in 0..3 {
                sum[c] += value * pixel[c] as f64;
            }
        });
        let alpha = source.get_pixel(x, y).0[3];
        let channel = |c: usize| (sum[c] + bias).clamp(0.0, 1.0) as f32;
        Rgba([channel(0), channel(1), channel(2), alpha])
    })
}

/// Per-channel minimum or maximum under the kernel's positive cells.
fn extreme(source: &Rgba32FImage, kernel: &KernelCells, which: Extreme) -> Rgba32FImage {
    ImageBuffer::from_fn(source.width(), source.height(), |x, y| {
        let original = source.get_pixel(x, y).0;
        let mut out = [original[0], original[1], original[2]];
        let mut seen = false;
        for_each_cell(source, kernel, x, y, |value, pixel| {
            if value <= 0.0 {
                return;
            }
            for c in 0..3 {
                out[c] = if !seen {
                    pixel[c]
                } else {
                    match which {
                        Extreme::Min => out[c].min(pixel[c]),
                        Extreme::Max => out[c].max(pixel[c]),
                    }
                };
            }
            seen = true;
        });
        Rgba([out[0], out[1], out[2], original[3]])
    })
}

// -- Tests --------------------------------------------------------------------
