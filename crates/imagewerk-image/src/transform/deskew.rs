// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deskew: detect the dominant text-line angle and rotate it back to level.
//
// Dark pixels vote in a projection-profile search: for each candidate angle
// the pixels are projected onto the axis perpendicular to it, and the angle
// whose row histogram is most peaked (largest sum of squared bin counts)
// wins. Candidates are visited in order of increasing magnitude so ties
// resolve towards the smaller correction.

use imageproc::geometric_transformations::Projection;
use imagewerk_core::artifacts::keys;
use imagewerk_core::error::Result;
use imagewerk_core::{ArtifactStore, DeskewSettings, Percentage};
use tracing::{debug, info, instrument};

use crate::handle::ImageHandle;
use crate::handle::sampling::warp_onto;

/// Search resolution in degrees.
const ANGLE_STEP: f64 = 0.1;

impl ImageHandle {
    /// Straighten the image and return the detected skew in degrees
    /// (positive when lines fall towards the right).
    #[instrument(skip_all, fields(threshold = %settings.threshold, auto_crop = settings.auto_crop))]
    pub fn deskew(&mut self, settings: &DeskewSettings) -> Result<f64> {
        self.with_artifacts(settings, |image| image.apply_deskew(settings.threshold))
    }

    fn apply_deskew(&mut self, threshold: Percentage) -> Result<f64> {
        let dark = self.dark_points(threshold.fraction() as f32);
        if dark.is_empty() {
            info!("No dark pixels, nothing to deskew");
            return Ok(0.0);
        }

        let angle = detect_skew(&dark, self.config().deskew_max_angle);
        info!(angle, votes = dark.len(), "Skew detected");
        if angle == 0.0 {
            return Ok(0.0);
        }

        let (width, height) = self.dimensions();
        let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
        let forward = Projection::translate(-cx, -cy)
            .and_then(Projection::rotate(-angle.to_radians() as f32))
            .and_then(Projection::translate(cx, cy));
        let rotated = warp_onto(self.pixels(), forward, width, height);
        self.replace_pixels(rotated);

        if self.artifact(keys::DESKEW_AUTO_CROP) == Some("true") {
            self.crop_to_content(angle);
        }
        Ok(angle)
    }

    /// Coordinates of visible pixels whose luminance is below `threshold`.
    fn dark_points(&self, threshold: f32) -> Vec<(f64, f64)> {
        self.pixels()
            .enumerate_pixels()
            .filter(|(_, _, p)| {
                let [r, g, b, a] = p.0;
                a > 0.0 && 0.2126 * r + 0.7152 * g + 0.0722 * b < threshold
            })
            .map(|(x, y, _)| (x as f64 + 0.5, y as f64 + 0.5))
            .collect()
    }

    /// Crop to the largest centred rectangle covered by the image after a
    /// rotation of `angle` degrees.
    fn crop_to_content(&mut self, angle: f64) {
        let (width, height) = self.dimensions();
        let (crop_w, crop_h) = largest_inscribed(width as f64, height as f64, angle.to_radians());
        let crop_w = (crop_w.floor() as u32).clamp(1, width);
        let crop_h = (crop_h.floor() as u32).clamp(1, height);
        let x = (width - crop_w) / 2;
        let y = (height - crop_h) / 2;
        debug!(crop_w, crop_h, x, y, "Auto-cropping deskewed image");

        let cropped = image::imageops::crop_imm(self.pixels(), x, y, crop_w, crop_h).to_image();
        self.replace_pixels(cropped);
    }
}

/// The candidate angle, in degrees, with the most peaked row profile.
fn detect_skew(points: &[(f64, f64)], max_angle: f64) -> f64 {
    let steps = (max_angle.abs() / ANGLE_STEP).round() as i64;
    let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let span = points.iter().map(|p| p.0).fold(0.0, f64::max)
        + points.iter().map(|p| p.1).fold(0.0, f64::max)
        - min_y;
    let bins = span.ceil() as usize * 2 + 2;

    let mut best = (0.0, f64::NEG_INFINITY);
    let mut histogram = vec![0u64; bins];
    for step in std::iter::once(0).chain((1..=steps).flat_map(|s| [s, -s])) {
        let angle = step as f64 * ANGLE_STEP;
        let (sin, cos) = angle.to_radians().sin_cos();

        histogram.iter_mut().for_each(|bin| *bin = 0);
        for &(x, y) in points {
            let projected = -x * sin + y * cos - min_y + span;
            let bin = (projected.floor().max(0.0) as usize).min(bins - 1);
            histogram[bin] += 1;
        }
        let score: f64 = histogram.iter().map(|&n| (n * n) as f64).sum();
        if score > best.1 {
            best = (angle, score);
        }
    }
    debug!(angle = best.0, score = best.1, "Projection profile search complete");
    best.0
}

/// Size of the largest axis-aligned rectangle inside a `width` x `height`
/// rectangle rotated by `angle` radians about its centre.
fn largest_inscribed(width: f64, height: f64, angle: f64) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }
    let width_is_longer = width >= height;
    let (long, short) = if width_is_longer {
        (width, height)
    } else {
        (height, width)
    };
    let sin = angle.sin().abs();
    let cos = angle.cos().abs();

    if short <= 2.0 * sin * cos * long || (sin - cos).abs() < 1e-10 {
        // Half-constrained: two crop corners touch the longer sides.
        let half = 0.5 * short;
        if width_is_longer {
            (half / sin, half / cos)
        } else {
            (half / cos, half / sin)
        }
    } else {
        let cos_2a = cos * cos - sin * sin;
        (
            (width * cos - height * sin) / cos_2a,
            (height * cos - width * sin) / cos_2a,
        )
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use imagewerk_core::Color;

    /// White page with three dark lines falling `degrees` to the right.
    fn skewed_lines(degrees: f64) -> ImageHandle {
        let slope = degrees.to_radians().tan();
        let pixels = ImageBuffer::from_fn(200, 120, |x, y| {
            let on_line = [20.0, 50.0, 80.0].iter().any(|start| {
                let line_y = start + x as f64 * slope;
                (y as f64 - line_y).abs() < 0.5
            });
            if on_line {
                Rgba(Color::BLACK.to_f32())
            } else {
                Rgba(Color::WHITE.to_f32())
            }
        });
        ImageHandle::from_pixels(pixels)
    }

    #[test]
    fn detects_line_angle() {
        let mut image = skewed_lines(3.0);
        let angle = image.deskew(&DeskewSettings::default()).unwrap();
        assert!((angle - 3.0).abs() < 0.5, "detected {angle}");
        assert_eq!(image.dimensions(), (200, 120));
    }

    #[test]
    fn detects_negative_angle() {
        let mut image = skewed_lines(-2.0);
        let angle = image.deskew(&DeskewSettings::default()).unwrap();
        assert!((angle + 2.0).abs() < 0.5, "detected {angle}");
    }

    #[test]
    fn level_lines_are_untouched() {
        let mut image = skewed_lines(0.0);
        let before = image.clone();
        let angle = image.deskew(&DeskewSettings::default()).unwrap();
        assert_eq!(angle, 0.0);
        assert_eq!(image.pixels(), before.pixels());
    }

    #[test]
    fn blank_image_returns_zero() {
        let mut image = ImageHandle::from_pixel(20, 20, Color::WHITE);
        let angle = image.deskew(&DeskewSettings::default()).unwrap();
        assert_eq!(angle, 0.0);
        assert_eq!(image.pixel_color(10, 10), Color::WHITE);
    }

    #[test]
    fn auto_crop_removes_exposed_corners() {
        let mut image = skewed_lines(3.0);
        let settings = DeskewSettings {
            auto_crop: true,
            ..DeskewSettings::default()
        };

        image.deskew(&settings).unwrap();

        let (width, height) = image.dimensions();
        assert!(width < 200 && height < 120, "{width}x{height}");
        // Just inside the crop corner is still covered by the source.
        assert_eq!(image.pixel_color(2, 2).a, 255);
        assert_eq!(image.artifact(keys::DESKEW_AUTO_CROP), None);
    }

    #[test]
    fn inscribed_rectangle_without_rotation_is_the_original() {
        let (w, h) = largest_inscribed(100.0, 50.0, 0.0);
        assert!((w - 100.0).abs() < 1e-9);
        assert!((h - 50.0).abs() < 1e-9);
    }
}
