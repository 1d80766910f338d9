// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Complex-image arithmetic. A complex image is a pair of images holding the
// real and imaginary parts of every RGB channel; alpha is taken from the
// first real image.

use image::{ImageBuffer, Rgba};
use imagewerk_core::artifacts::{keys, remove_image_artifacts, set_image_artifacts};
use imagewerk_core::error::{ImagewerkError, Result};
use imagewerk_core::{ComplexOperator, ComplexSettings};
use tracing::{info, instrument};

use crate::handle::ImageHandle;

/// Apply `settings.operator` to `images`, given as `[real, imaginary]`
/// pairs: one pair for `Conjugate`, two pairs for the binary operators.
/// Returns the result as a `[real, imaginary]` pair, clamped to `0.0..=1.0`.
///
/// The artifacts of `settings` are placed on the first image for the
/// duration of the call.
#[instrument(skip_all, fields(operator = ?settings.operator, images = images.len()))]
pub fn complex(
    images: &mut [ImageHandle],
    settings: &ComplexSettings,
) -> Result<Vec<ImageHandle>> {
    let Some(first) = images.first_mut() else {
        return Err(ImagewerkError::InvalidArgument(
            "complex operations need at least one image pair".into(),
        ));
    };
    set_image_artifacts(first, settings);
    let result = apply(images, settings.operator);
    if let Some(first) = images.first_mut() {
        remove_image_artifacts(first, settings);
    }
    result
}

fn apply(images: &[ImageHandle], operator: ComplexOperator) -> Result<Vec<ImageHandle>> {
    let expected = match operator {
        ComplexOperator::Conjugate => 2,
        _ => 4,
    };
    if images.len() != expected {
        return Err(ImagewerkError::InvalidArgument(format!(
            "{operator:?} needs {expected} images, got {}",
            images.len()
        )));
    }
    let dimensions = images[0].dimensions();
    if let Some(other) = images.iter().find(|image| image.dimensions() != dimensions) {
        return Err(ImagewerkError::DimensionMismatch {
            expected: dimensions,
            actual: other.dimensions(),
        });
    }

    let snr = images[0]
        .parse_artifact::<f64>(keys::COMPLEX_SNR)?
        .unwrap_or(0.0);
    info!(snr, "Applying complex operator");

    let (width, height) = dimensions;
    let mut real = ImageBuffer::new(width, height);
    let mut imaginary = ImageBuffer::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let ar = images[0].pixels().get_pixel(x, y).0;
            let ai = images[1].pixels().get_pixel(x, y).0;
            let (br, bi) = if expected == 4 {
                (
                    images[2].pixels().get_pixel(x, y).0,
                    images[3].pixels().get_pixel(x, y).0,
                )
            } else {
                ([0.0; 4], [0.0; 4])
            };

            let mut out_r = [0.0f32; 4];
            let mut out_i = [0.0f32; 4];
            for c in 0..3 {
                let a = (ar[c] as f64, ai[c] as f64);
                let b = (br[c] as f64, bi[c] as f64);
                let (re, im) = combine(operator, a, b, snr);
                out_r[c] = re.clamp(0.0, 1.0) as f32;
                out_i[c] = im.clamp(0.0, 1.0) as f32;
            }
            out_r[3] = ar[3];
            out_i[3] = ar[3];
            real.put_pixel(x, y, Rgba(out_r));
            imaginary.put_pixel(x, y, Rgba(out_i));
        }
    }

    Ok(vec![images[0].derive(real), images[0].derive(imaginary)])
}

fn combine(operator: ComplexOperator, a: (f64, f64), b: (f64, f64), snr: f64) -> (f64, f64) {
    let (ar, ai) = a;
    let (br, bi) = b;
    match operator {
        ComplexOperator::Add => (ar + br, ai + bi),
        ComplexOperator::Subtract => (ar - br, ai - bi),
        ComplexOperator::Multiply => (ar * br - ai * bi, ar * bi + ai * br),
        ComplexOperator::Divide => {
            let denominator = br * br + bi * bi + snr;
            if denominator.abs() < f64::EPSILON {
                (0.0, 0.0)
            } else {
                (
                    (ar * br + ai * bi) / denominator,
                    (ai * br - ar * bi) / denominator,
                )
            }
        }
        ComplexOperator::Conjugate => (ar, -ai),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagewerk_core::{ArtifactStore, Color};

    fn gray(level: u8) -> ImageHandle {
        ImageHandle::from_pixel(3, 2, Color::rgb(level, level, level))
    }

    fn red_channel(image: &ImageHandle) -> f32 {
        image.pixels().get_pixel(1, 1).0[0]
    }

    #[test]
    fn add_sums_parts() {
        let mut images = vec![gray(51), gray(26), gray(77), gray(102)];
        let out = complex(&mut images, &ComplexSettings::new(ComplexOperator::Add)).unwrap();
        assert!((red_channel(&out[0]) - 0.5).abs() < 0.01);
        assert!((red_channel(&out[1]) - 0.5).abs() < 0.01);
    }

    #[test]
    fn multiply_follows_complex_rule() {
        // (0.5 + 0.5i)(0.5 + 0i) = 0.25 + 0.25i
        let mut images = vec![gray(128), gray(128), gray(128), gray(0)];
        let out = complex(&mut images, &ComplexSettings::new(ComplexOperator::Multiply)).unwrap();
        assert!((red_channel(&out[0]) - 0.25).abs() < 0.01);
        assert!((red_channel(&out[1]) - 0.25).abs() < 0.01);
    }

    #[test]
    fn divide_uses_signal_to_noise_ratio() {
        let mut images = vec![gray(128), gray(0), gray(128), gray(0)];
        let plain = complex(&mut images, &ComplexSettings::new(ComplexOperator::Divide)).unwrap();
        assert!((red_channel(&plain[0]) - 1.0).abs() < 0.01);

        // 0.25 / (0.25 + 0.25)
        let settings = ComplexSettings {
            signal_to_noise_ratio: Some(0.25),
            ..ComplexSettings::new(ComplexOperator::Divide)
        };
        let damped = complex(&mut images, &settings).unwrap();
        assert!((red_channel(&damped[0]) - 0.5).abs() < 0.01);
        assert_eq!(images[0].artifact(keys::COMPLEX_SNR), None);
    }

    #[test]
    fn conjugate_needs_one_pair() {
        let mut images = vec![gray(200), gray(0)];
        let out = complex(&mut images, &ComplexSettings::new(ComplexOperator::Conjugate)).unwrap();
        assert_eq!(out.len(), 2);
        assert!((red_channel(&out[0]) - 200.0 / 255.0).abs() < 0.01);

        let mut too_many = vec![gray(1), gray(2), gray(3), gray(4)];
        let err = complex(&mut too_many, &ComplexSettings::new(ComplexOperator::Conjugate))
            .unwrap_err();
        assert!(matches!(err, ImagewerkError::InvalidArgument(_)));
    }

    #[test]
    fn mismatched_sizes_are_rejected_and_cleaned_up() {
        let mut images = vec![
            gray(1),
            gray(2),
            gray(3),
            ImageHandle::from_pixel(9, 9, Color::BLACK),
        ];
        let settings = ComplexSettings {
            signal_to_noise_ratio: Some(1.0),
            ..ComplexSettings::new(ComplexOperator::Add)
        };
        let err = complex(&mut images, &settings).unwrap_err();
        assert!(matches!(err, ImagewerkError::DimensionMismatch { .. }));
        assert_eq!(images[0].artifact(keys::COMPLEX_SNR), None);
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = complex(&mut [], &ComplexSettings::default()).unwrap_err();
        assert!(matches!(err, ImagewerkError::InvalidArgument(_)));
    }
}
