// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image comparison: distortion metrics and the highlighted difference image.

use image::{ImageBuffer, Rgba};
use imagewerk_core::artifacts::keys;
use imagewerk_core::error::{ImagewerkError, Result};
use imagewerk_core::{Color, CompareSettings, ErrorMetric};
use tracing::{debug, info, instrument};

use crate::handle::ImageHandle;

/// Outcome of `compare_with_settings`.
#[derive(Debug, Clone)]
pub struct CompareResult {
    /// Value of the requested metric.
    pub distortion: f64,
    /// This image with highlight, lowlight and masklight colours composited
    /// over differing, matching and masked pixels respectively.
    pub difference: ImageHandle,
}

/// Running sums over every unmasked channel sample.
#[derive(Debug, Default)]
struct Accumulator {
    samples: u64,
    differing_pixels: u64,
    sum_abs: f64,
    sum_sq: f64,
    peak: f64,
    sum_a: f64,
    sum_b: f64,
    sum_aa: f64,
    sum_bb: f64,
    sum_ab: f64,
}

impl ImageHandle {
    /// Compute `metric` between this image and `reference`.
    #[instrument(skip_all, fields(metric = ?metric, width = self.width(), height = self.height()))]
    pub fn compare(&self, reference: &ImageHandle, metric: ErrorMetric) -> Result<f64> {
        self.check_same_dimensions(reference)?;
        let acc = self.accumulate(reference);
        let distortion = distortion(&acc, metric);
        debug!(distortion, samples = acc.samples, "Comparison complete");
        Ok(distortion)
    }

    /// Compare against `reference` and render the difference image, using the
    /// colours from `settings` (or the defaults).
    #[instrument(skip_all, fields(metric = ?settings.metric))]
    pub fn compare_with_settings(
        &mut self,
        reference: &ImageHandle,
        settings: &CompareSettings,
    ) -> Result<CompareResult> {
        info!("Comparing images");
        self.with_artifacts(settings, |image| {
            let distortion = image.compare(reference, settings.metric)?;
            let difference = image.difference_image(reference)?;
            Ok(CompareResult {
                distortion,
                difference,
            })
        })
    }

    fn check_same_dimensions(&self, reference: &ImageHandle) -> Result<()> {
        if self.dimensions() != reference.dimensions() {
            return Err(ImagewerkError::DimensionMismatch {
                expected: self.dimensions(),
                actual: reference.dimensions(),
            });
        }
        Ok(())
    }

    fn accumulate(&self, reference: &ImageHandle) -> Accumulator {
        let fuzz = self.config().fuzz.fraction();
        let mut acc = Accumulator::default();

        for (x, y, pixel) in self.pixels().enumerate_pixels() {
            if !self.is_unmasked(x, y) {
                continue;
            }
            let other = reference.pixels().get_pixel(x, y);
            if pixel_distance(&pixel.0, &other.0) > fuzz {
                acc.differing_pixels += 1;
            }
            for c in 0..4 {
                let a = pixel.0[c] as f64;
                let b = other.0[c] as f64;
                let diff = (a - b).abs();
                acc.samples += 1;
                acc.sum_abs += diff;
                acc.sum_sq += diff * diff;
                acc.peak = acc.peak.max(diff);
                acc.sum_a += a;
                acc.sum_b += b;
                acc.sum_aa += a * a;
                acc.sum_bb += b * b;
                acc.sum_ab += a * b;
            }
        }
        acc
    }

    fn difference_image(&self, reference: &ImageHandle) -> Result<ImageHandle> {
        let highlight = self
            .parse_artifact::<Color>(keys::COMPARE_HIGHLIGHT_COLOR)?
            .unwrap_or(Color::HIGHLIGHT)
            .to_f32();
        let lowlight = self
            .parse_artifact::<Color>(keys::COMPARE_LOWLIGHT_COLOR)?
            .unwrap_or(Color::LOWLIGHT)
            .to_f32();
        let masklight = self
            .parse_artifact::<Color>(keys::COMPARE_MASKLIGHT_COLOR)?
            .unwrap_or(Color::MASKLIGHT)
            .to_f32();
        let fuzz = self.config().fuzz.fraction();

        let source = self.pixels();
        let pixels = ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            let pixel = source.get_pixel(x, y).0;
            let overlay = if !self.is_unmasked(x, y) {
                masklight
            } else if pixel_distance(&pixel, &reference.pixels().get_pixel(x, y).0) > fuzz {
                highlight
            } else {
                lowlight
            };
            Rgba(composite_over(overlay, pixel))
        });
        Ok(self.derive(pixels))
    }
}

fn distortion(acc: &Accumulator, metric: ErrorMetric) -> f64 {
    if acc.samples == 0 {
        return 0.0;
    }
    let n = acc.samples as f64;
    let mse = acc.sum_sq / n;
    match metric {
        ErrorMetric::Absolute => acc.differing_pixels as f64,
        ErrorMetric::MeanAbsolute => acc.sum_abs / n,
        ErrorMetric::MeanSquared => mse,
        ErrorMetric::RootMeanSquared => mse.sqrt(),
        ErrorMetric::PeakAbsolute => acc.peak,
        ErrorMetric::PeakSignalToNoiseRatio => {
            if mse == 0.0 {
                f64::INFINITY
            } else {
                10.0 * (1.0 / mse).log10()
            }
        }
        ErrorMetric::NormalizedCrossCorrelation => {
            let mean_a = acc.sum_a / n;
            let mean_b = acc.sum_b / n;
            let var_a = (acc.sum_aa / n - mean_a * mean_a).max(0.0);
            let var_b = (acc.sum_bb / n - mean_b * mean_b).max(0.0);
            let denom = (var_a * var_b).sqrt();
            if denom < 1e-12 {
                // Constant images: only identical ones correlate.
                if mse == 0.0 { 1.0 } else { 0.0 }
            } else {
                (acc.sum_ab / n - mean_a * mean_b) / denom
            }
        }
    }
}

/// Root-mean-square channel difference between two pixels.
fn pixel_distance(a: &[f32; 4], b: &[f32; 4]) -> f64 {
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum();
    (sum / 4.0).sqrt()
}

/// Porter-Duff "over" of `top` onto `bottom`.
fn composite_over(top: [f32; 4], bottom: [f32; 4]) -> [f32; 4] {
    let alpha_top = top[3];
    let alpha_bottom = bottom[3];
    let alpha = alpha_top + alpha_bottom * (1.0 - alpha_top);
    if alpha <= f32::EPSILON {
        return [0.0; 4];
    }
    let mut out = [0.0f32; 4];
    for c in 0..3 {
        out[c] = (top[c] * alpha_top + bottom[c] * alpha_bottom * (1.0 - alpha_top)) / alpha;
    }
    out[3] = alpha;
    out
}

// -- Tests --------------------------------------------------------------------
