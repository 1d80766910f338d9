// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Mean-shift smoothing. Each pixel climbs towards the mean position and
// colour of the neighbours that are both within a circular window and close
// in colour, which flattens regions while keeping strong edges.

use image::{ImageBuffer, Rgba, Rgba32FImage};
use imagewerk_core::Percentage;
use imagewerk_core::error::{ImagewerkError, Result};
use tracing::{debug, info, instrument};

use crate::handle::ImageHandle;

/// Colour distance used when none is given.
pub const DEFAULT_COLOR_DISTANCE: Percentage = Percentage(10.0);

/// Squared shift (pixels, plus colour scaled to 8-bit units) at which a pixel
/// is considered converged.
const CONVERGENCE: f64 = 3.0;

impl ImageHandle {
    /// Mean-shift with a `size` x `size` window and the default colour
    /// distance.
    pub fn mean_shift(&mut self, size: u32) -> Result<()> {
        self.mean_shift_with(size, DEFAULT_COLOR_DISTANCE)
    }

    /// Mean-shift with a `size` x `size` window; neighbours further than
    /// `color_distance` in colour are ignored.
    #[instrument(skip(self), fields(width = self.width(), height = self.height()))]
    pub fn mean_shift_with(&mut self, size: u32, color_distance: Percentage) -> Result<()> {
        if size == 0 {
            return Err(ImagewerkError::InvalidArgument(
                "mean-shift size must be at least 1".into(),
            ));
        }
        let radius = (size / 2) as i64;
        if radius == 0 {
            debug!("Single-pixel window, image unchanged");
            return Ok(());
        }

        info!(size, %color_distance, "Applying mean-shift");
        let threshold = color_distance.fraction();
        let max_iterations = self.config().mean_shift_max_iterations;
        let source = self.pixels();
        let shifted = ImageBuffer::from_fn(source.width(), source.height(), |x, y| {
            shift_pixel(source, x, y, radius, threshold * threshold, max_iterations)
        });
        self.replace_pixels(shifted);
        Ok(())
    }
}

fn shift_pixel(
    source: &Rgba32FImage,
    x: u32,
    y: u32,
    radius: i64,
    threshold_sq: f64,
    max_iterations: u32,
) -> Rgba<f32> {
    let (width, height) = (source.width() as i64, source.height() as i64);
    let original = source.get_pixel(x, y).0;
    let mut cx = x as f64;
    let mut cy = y as f64;
    let mut color = [original[0] as f64, original[1] as f64, original[2] as f64];

    for _ in 0..max_iterations {
        let px = cx.round() as i64;
        let py = cy.round() as i64;

        let mut count = 0u32;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut sum_color = [0.0f64; 3];

        for v in -radius..=radius {
            for u in -radius..=radius {
                if u * u + v * v > radius * radius {
                    continue;
                }
                let (sx, sy) = (px + u, py + v);
                if sx < 0 || sy < 0 || sx >= width || sy >= height {
                    continue;
                }
                let sample = source.get_pixel(sx as u32, sy as u32).0;
                let sample = [sample[0] as f64, sample[1] as f64, sample[2] as f64];
                if color_distance_sq(&color, &sample) > threshold_sq {
                    continue;
                }
                count += 1;
                sum_x += sx as f64;
                sum_y += sy as f64;
                for c in 0..3 {
                    sum_color[c] += sample[c];
                }
            }
        }

        if count == 0 {
            break;
        }
        let n = count as f64;
        let next_x = sum_x / n;
        let next_y = sum_y / n;
        let next_color = [sum_color[0] / n, sum_color[1] / n, sum_color[2] / n];

        let shift = (next_x - cx).powi(2)
            + (next_y - cy).powi(2)
            + 255.0 * 255.0 * color_distance_sq(&color, &next_color);
        cx = next_x;
        cy = next_y;
        color = next_color;
        if shift <= CONVERGENCE {
            break;
        }
    }

    Rgba([color[0] as f32, color[1] as f32, color[2] as f32, original[3]])
}

fn color_distance_sq(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (0..3).map(|c| (a[c] - b[c]).powi(2)).sum()
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use imagewerk_core::{Color, EngineConfig, ErrorMetric};

    /// Deterministic low-contrast texture.
    fn textured(width: u32, height: u32) -> ImageHandle {
        let pixels = ImageBuffer::from_fn(width, height, |x, y| {
            let v = 100 + ((x * 31 + y * 17) % 7) * 8;
            Rgba(Color::rgb(v as u8, (v / 2) as u8, 60).to_f32())
        });
        ImageHandle::from_pixels(pixels)
    }

    #[test]
    fn should_not_change_image_when_size_is_one() {
        let input = textured(24, 16);
        let mut output = input.clone();

        output.mean_shift(1).unwrap();

        assert_eq!(
            output.compare(&input, ErrorMetric::RootMeanSquared).unwrap(),
            0.0
        );
    }

    #[test]
    fn should_change_image() {
        let input = textured(24, 16);
        let mut output = input.clone();

        output.mean_shift_with(2, Percentage::new(80.0)).unwrap();

        let rmse = output.compare(&input, ErrorMetric::RootMeanSquared).unwrap();
        assert!((rmse - 0.0449).abs() < 0.0005, "unexpected rmse {rmse}");
    }

    #[test]
    fn zero_iteration_limit_leaves_pixels_in_place() {
        let config = EngineConfig {
            mean_shift_max_iterations: 0,
            ..EngineConfig::default()
        };
        let input = textured(24, 16);
        let mut output = input.clone().with_config(config);

        output.mean_shift_with(5, Percentage::new(80.0)).unwrap();

        assert_eq!(output.pixels(), input.pixels());
    }

    #[test]
    fn single_iteration_differs_from_convergence() {
        let input = textured(24, 16);
        let mut once = input.clone().with_config(EngineConfig {
            mean_shift_max_iterations: 1,
            ..EngineConfig::default()
        });
        let mut converged = input.clone();

        once.mean_shift_with(5, Percentage::new(80.0)).unwrap();
        converged.mean_shift_with(5, Percentage::new(80.0)).unwrap();

        assert_ne!(once.pixels(), input.pixels());
        assert_ne!(once.pixels(), converged.pixels());
    }

    #[test]
    fn keeps_edges_between_distant_colours() {
        let pixels = ImageBuffer::from_fn(12, 6, |x, _| {
            Rgba(if x < 6 { Color::BLACK } else { Color::WHITE }.to_f32())
        });
        let input = ImageHandle::from_pixels(pixels);
        let mut output = input.clone();

        output.mean_shift_with(5, Percentage::new(10.0)).unwrap();

        assert_eq!(
            output.compare(&input, ErrorMetric::RootMeanSquared).unwrap(),
            0.0
        );
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut image = textured(4, 4);
        assert!(matches!(
            image.mean_shift(0),
            Err(ImagewerkError::InvalidArgument(_))
        ));
    }
}
