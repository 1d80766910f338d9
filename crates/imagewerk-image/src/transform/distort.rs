// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Distort: scale-rotate-translate and affine resampling.
//
// Argument layouts for `ScaleRotateTranslate` (origin defaults to the image
// centre, destination defaults to the origin):
//
//   angle
//   scale angle
//   x,y angle
//   x,y scale angle
//   x,y sx,sy angle
//   x,y scale angle nx,ny
//   x,y sx,sy angle nx,ny
//
// `Affine` takes `sx,rx,ry,sy,tx,ty`, mapping (x, y) to
// (sx*x + ry*y + tx, rx*x + sy*y + ty).

use imageproc::geometric_transformations::Projection;
use imagewerk_core::artifacts::keys;
use imagewerk_core::error::{ImagewerkError, Result};
use imagewerk_core::{DistortMethod, DistortSettings, Geometry};
use tracing::{debug, info, instrument};

use crate::handle::ImageHandle;
use crate::handle::sampling::warp_onto;

/// Tolerance when snapping a best-fit canvas to whole pixels.
const SNAP: f32 = 1e-3;

/// Output canvas in distorted coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Canvas {
    x: f32,
    y: f32,
    width: u32,
    height: u32,
}

impl ImageHandle {
    /// Resample the image through the transform described by `method` and
    /// `args`.
    #[instrument(skip_all, fields(method = ?method, args = ?args, bestfit = settings.bestfit))]
    pub fn distort(
        &mut self,
        method: DistortMethod,
        args: &[f64],
        settings: &DistortSettings,
    ) -> Result<()> {
        let forward = match method {
            DistortMethod::ScaleRotateTranslate => self.scale_rotate_translate(args)?,
            DistortMethod::Affine => affine(args)?,
        };
        self.with_artifacts(settings, |image| image.apply_distort(forward, settings.bestfit))
    }

    fn apply_distort(&mut self, forward: Projection, bestfit: bool) -> Result<()> {
        let canvas = match self.parse_artifact::<Geometry>(keys::DISTORT_VIEWPORT)? {
            Some(viewport) => Canvas {
                x: viewport.x as f32,
                y: viewport.y as f32,
                width: viewport.width,
                height: viewport.height,
            },
            None if bestfit => self.bounding_canvas(&forward),
            None => Canvas {
                x: 0.0,
                y: 0.0,
                width: self.width(),
                height: self.height(),
            },
        };

        let scale = self.parse_artifact::<f64>(keys::DISTORT_SCALE)?.unwrap_or(1.0);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ImagewerkError::InvalidArtifact {
                key: keys::DISTORT_SCALE.to_owned(),
                value: scale.to_string(),
            });
        }

        let width = (canvas.width as f64 * scale).round() as u32;
        let height = (canvas.height as f64 * scale).round() as u32;
        if width == 0 || height == 0 {
            return Err(ImagewerkError::InvalidGeometry(format!(
                "distorted canvas {}x{} is empty",
                width, height
            )));
        }
        debug!(?canvas, scale, width, height, "Distort output canvas");

        let to_canvas = forward
            .and_then(Projection::translate(-canvas.x, -canvas.y))
            .and_then(Projection::scale(scale as f32, scale as f32));
        let distorted = warp_onto(self.pixels(), to_canvas, width, height);
        self.replace_pixels(distorted);

        info!(width, height, "Image distorted");
        Ok(())
    }

    /// Bounding box of the transformed image corners.
    fn bounding_canvas(&self, forward: &Projection) -> Canvas {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)].map(|p| *forward * p);

        let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
        let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
        let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);

        let left = (min_x + SNAP).floor();
        let top = (min_y + SNAP).floor();
        let right = (max_x - SNAP).ceil();
        let bottom = (max_y - SNAP).ceil();
        Canvas {
            x: left,
            y: top,
            width: (right - left).max(1.0) as u32,
            height: (bottom - top).max(1.0) as u32,
        }
    }

    fn scale_rotate_translate(&self, args: &[f64]) -> Result<Projection> {
        let centre = (self.width() as f64 / 2.0, self.height() as f64 / 2.0);
        let (origin, sx, sy, angle, target) = match *args {
            [angle] => (centre, 1.0, 1.0, angle, None),
            [scale, angle] => (centre, scale, scale, angle, None),
            [x, y, angle] => ((x, y), 1.0, 1.0, angle, None),
            [x, y, scale, angle] => ((x, y), scale, scale, angle, None),
            [x, y, sx, sy, angle] => ((x, y), sx, sy, angle, None),
            [x, y, scale, angle, nx, ny] => ((x, y), scale, scale, angle, Some((nx, ny))),
            [x, y, sx, sy, angle, nx, ny] => ((x, y), sx, sy, angle, Some((nx, ny))),
            _ => {
                return Err(ImagewerkError::InvalidArgument(format!(
                    "scale-rotate-translate takes 1 to 7 arguments, got {}",
                    args.len()
                )));
            }
        };
        if sx == 0.0 || sy == 0.0 || !(sx.is_finite() && sy.is_finite()) {
            return Err(ImagewerkError::InvalidArgument(format!(
                "scale {sx},{sy} is not invertible"
            )));
        }
        let (nx, ny) = target.unwrap_or(origin);

        Ok(Projection::translate(-origin.0 as f32, -origin.1 as f32)
            .and_then(Projection::scale(sx as f32, sy as f32))
            .and_then(Projection::rotate(angle.to_radians() as f32))
            .and_then(Projection::translate(nx as f32, ny as f32)))
    }
}

fn affine(args: &[f64]) -> Result<Projection> {
    let [sx, rx, ry, sy, tx, ty] = *args else {
        return Err(ImagewerkError::InvalidArgument(format!(
            "affine takes 6 arguments (sx,rx,ry,sy,tx,ty), got {}",
            args.len()
        )));
    };
    let determinant = sx * sy - rx * ry;
    if determinant.abs() < f64::EPSILON {
        return Err(ImagewerkError::InvalidArgument(
            "affine matrix is singular".into(),
        ));
    }
    #[rustfmt::skip]
    let matrix = [
        sx as f32, ry as f32, tx as f32,
        rx as f32, sy as f32, ty as f32,
        0.0,       0.0,       1.0,
    ];
    Projection::from_matrix(matrix)
        .ok_or_else(|| ImagewerkError::InvalidArgument("affine matrix is singular".into()))
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use imagewerk_core::{ArtifactStore, Color};

    fn gradient(width: u32, height: u32) -> ImageHandle {
        ImageHandle::from_pixels(ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([
                x as f32 / width as f32,
                y as f32 / height as f32,
                0.5,
                1.0,
            ])
        }))
    }

    #[test]
    fn zero_rotation_is_identity() {
        let mut image = gradient(6, 4);
        let before = image.clone();
        image
            .distort(DistortMethod::ScaleRotateTranslate, &[0.0], &DistortSettings::default())
            .unwrap();
        assert_eq!(image.dimensions(), (6, 4));
        for (a, b) in before.pixels().pixels().zip(image.pixels().pixels()) {
            for c in 0..4 {
                assert!((a.0[c] - b.0[c]).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn scale_artifact_multiplies_resolution() {
        let mut image = gradient(4, 3);
        let settings = DistortSettings {
            scale: Some(2.0),
            ..DistortSettings::default()
        };
        image
            .distort(DistortMethod::ScaleRotateTranslate, &[0.0], &settings)
            .unwrap();
        assert_eq!(image.dimensions(), (8, 6));
        assert_eq!(image.artifact(keys::DISTORT_SCALE), None);
    }

    #[test]
    fn viewport_sets_the_canvas() {
        let mut image = gradient(4, 4);
        let settings = DistortSettings {
            viewport: Some(Geometry::with_offset(5, 3, -1, 0)),
            ..DistortSettings::default()
        };
        image
            .distort(DistortMethod::ScaleRotateTranslate, &[0.0], &settings)
            .unwrap();
        assert_eq!(image.dimensions(), (5, 3));
        // The first column lies left of the source.
        assert_eq!(image.pixel_color(0, 1), Color::TRANSPARENT);
        assert_eq!(image.artifact(keys::DISTORT_VIEWPORT), None);
    }

    #[test]
    fn bestfit_holds_a_quarter_turn() {
        let mut image = gradient(4, 2);
        let settings = DistortSettings {
            bestfit: true,
            ..DistortSettings::default()
        };
        image
            .distort(DistortMethod::ScaleRotateTranslate, &[90.0], &settings)
            .unwrap();
        assert_eq!(image.dimensions(), (2, 4));
    }

    #[test]
    fn affine_translation_shifts_pixels() {
        let mut image = gradient(3, 1);
        let before = image.clone();
        image
            .distort(
                DistortMethod::Affine,
                &[1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
                &DistortSettings::default(),
            )
            .unwrap();
        assert_eq!(image.pixel_color(0, 0), Color::TRANSPARENT);
        assert_eq!(image.pixel_color(1, 0), before.pixel_color(0, 0));
        assert_eq!(image.pixel_color(2, 0), before.pixel_color(1, 0));
    }

    #[test]
    fn wrong_argument_counts_are_rejected() {
        let mut image = gradient(3, 3);
        let settings = DistortSettings::default();
        for args in [&[][..], &[1.0; 8][..]] {
            let err = image
                .distort(DistortMethod::ScaleRotateTranslate, args, &settings)
                .unwrap_err();
            assert!(matches!(err, ImagewerkError::InvalidArgument(_)));
        }
        let err = image
            .distort(DistortMethod::Affine, &[1.0; 5], &settings)
            .unwrap_err();
        assert!(matches!(err, ImagewerkError::InvalidArgument(_)));
    }

    #[test]
    fn singular_transforms_are_rejected() {
        let mut image = gradient(3, 3);
        let settings = DistortSettings::default();
        let err = image
            .distort(DistortMethod::Affine, &[0.0; 6], &settings)
            .unwrap_err();
        assert!(matches!(err, ImagewerkError::InvalidArgument(_)));

        let err = image
            .distort(DistortMethod::ScaleRotateTranslate, &[0.0, 45.0], &settings)
            .unwrap_err();
        assert!(matches!(err, ImagewerkError::InvalidArgument(_)));
    }

    #[test]
    fn bad_scale_artifact_cleans_up() {
        let mut image = gradient(3, 3);
        let settings = DistortSettings {
            scale: Some(-1.0),
            viewport: Some(Geometry::new(2, 2)),
            ..DistortSettings::default()
        };
        let err = image
            .distort(DistortMethod::ScaleRotateTranslate, &[0.0], &settings)
            .unwrap_err();
        assert!(matches!(err, ImagewerkError::InvalidArtifact { .. }));
        assert_eq!(image.artifacts().count(), 0);
        assert_eq!(image.dimensions(), (3, 3));
    }
}
