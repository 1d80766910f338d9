// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// K-means colour reduction (Lloyd's algorithm in RGB space).
//
// Initial means come from the `kmeans:seed-colors` artifact, topped up with
// the sampled image colours farthest from the means chosen so far.

use image::Rgba;
use imagewerk_core::artifacts::keys;
use imagewerk_core::error::{ImagewerkError, Result};
use imagewerk_core::{ArtifactStore, Color, KmeansSettings};
use tracing::{debug, info, instrument, warn};

use crate::handle::ImageHandle;

type Rgb = [f64; 3];

impl ImageHandle {
    /// Reduce the image to at most `settings.number_colors` colours and
    /// return the final cluster colours.
    #[instrument(skip_all, fields(
        number_colors = settings.number_colors,
        max_iterations = settings.max_iterations,
    ))]
    pub fn kmeans(&mut self, settings: &KmeansSettings) -> Result<Vec<Color>> {
        if settings.number_colors == 0 {
            return Err(ImagewerkError::InvalidArgument(
                "k-means needs at least one colour".into(),
            ));
        }
        info!("Applying k-means colour reduction");
        self.with_artifacts(settings, |image| image.apply_kmeans(settings))
    }

    fn apply_kmeans(&mut self, settings: &KmeansSettings) -> Result<Vec<Color>> {
        let samples: Vec<Rgb> = self
            .pixels()
            .pixels()
            .map(|p| [p.0[0] as f64, p.0[1] as f64, p.0[2] as f64])
            .collect();
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let mut means = self.seed_means(&samples, settings.number_colors as usize)?;
        let mut previous = f64::INFINITY;

        for iteration in 0..settings.max_iterations {
            let mut sums = vec![[0.0f64; 3]; means.len()];
            let mut counts = vec![0u64; means.len()];
            let mut distortion = 0.0;

            for sample in &samples {
                let (cluster, distance) = nearest(&means, sample);
                distortion += distance;
                counts[cluster] += 1;
                for c in 0..3 {
                    sums[cluster][c] += sample[c];
                }
            }

            for (mean, (sum, count)) in means.iter_mut().zip(sums.iter().zip(&counts)) {
                if *count > 0 {
                    let n = *count as f64;
                    *mean = [sum[0] / n, sum[1] / n, sum[2] / n];
                }
            }

            let change = (previous - distortion).abs() / distortion.max(f64::EPSILON);
            debug!(iteration, distortion, change, "k-means iteration");
            if previous.is_finite() && change <= settings.tolerance {
                break;
            }
            previous = distortion;
        }

        let mut pixels = self.pixels().clone();
        for pixel in pixels.pixels_mut() {
            let sample = [pixel.0[0] as f64, pixel.0[1] as f64, pixel.0[2] as f64];
            let (cluster, _) = nearest(&means, &sample);
            let mean = means[cluster];
            *pixel = Rgba([mean[0] as f32, mean[1] as f32, mean[2] as f32, pixel.0[3]]);
        }
        self.replace_pixels(pixels);

        Ok(means
            .iter()
            .map(|m| Color::from_f32([m[0] as f32, m[1] as f32, m[2] as f32, 1.0]))
            .collect())
    }

    /// Seed colours from the artifact, then farthest-point picks from an even
    /// sample of the image, up to `k`.
    fn seed_means(&self, samples: &[Rgb], k: usize) -> Result<Vec<Rgb>> {
        let mut means: Vec<Rgb> = Vec::with_capacity(k);

        if let Some(seeds) = self.artifact(keys::KMEANS_SEED_COLORS) {
            for seed in seeds.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                let color: Color = seed.parse().map_err(|_| {
                    warn!(seed, "Unparsable k-means seed colour");
                    ImagewerkError::InvalidArtifact {
                        key: keys::KMEANS_SEED_COLORS.to_owned(),
                        value: seeds.to_owned(),
                    }
                })?;
                if means.len() < k {
                    let [r, g, b, _] = color.to_f32();
                    means.push([r as f64, g as f64, b as f64]);
                }
            }
        }

        let limit = self.config().kmeans_sample_limit.clamp(1, samples.len());
        let stride = (samples.len() / limit).max(1);
        let candidates: Vec<Rgb> = samples.iter().step_by(stride).copied().collect();

        if means.is_empty() {
            means.push(candidates[0]);
        }
        while means.len() < k {
            let (farthest, distance) = candidates
                .iter()
                .map(|candidate| (candidate, nearest(&means, candidate).1))
                .fold((&candidates[0], 0.0), |best, next| {
                    if next.1 > best.1 { next } else { best }
                });
            if distance <= 0.0 {
                // Every sampled colour is already a mean.
                break;
            }
            means.push(*farthest);
        }

        debug!(seeds = means.len(), requested = k, "k-means seeds chosen");
        Ok(means)
    }
}

/// Index of the closest mean and the squared distance to it.
fn nearest(means: &[Rgb], sample: &Rgb) -> (usize, f64) {
    means
        .iter()
        .enumerate()
        .map(|(index, mean)| {
            let distance: f64 = (0..3).map(|c| (mean[c] - sample[c]).powi(2)).sum();
            (index, distance)
        })
        .fold((0, f64::INFINITY), |best, candidate| {
            if candidate.1 < best.1 { candidate } else { best }
        })
}

// -- Tests --------------------------------------------------------------------
