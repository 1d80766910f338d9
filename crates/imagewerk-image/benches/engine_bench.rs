// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the hot loops in imagewerk-image: mean-shift
// smoothing and RMSE comparison on a small synthetic texture.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{ImageBuffer, Rgba};

use imagewerk_core::{Color, ErrorMetric, Percentage};
use imagewerk_image::ImageHandle;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 64x64 checker of two close greys with a bright diagonal band, so the
/// mean-shift window has both flat and edge regions to walk.
fn texture() -> ImageHandle {
    let pixels = ImageBuffer::from_fn(64, 64, |x, y| {
        let color = if (x as i32 - y as i32).abs() < 4 {
            Color::rgb(230, 200, 40)
        } else if (x / 4 + y / 4) % 2 == 0 {
            Color::rgb(90, 90, 90)
        } else {
            Color::rgb(100, 100, 100)
        };
        Rgba(color.to_f32())
    });
    ImageHandle::from_pixels(pixels)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_mean_shift(c: &mut Criterion) {
    let source = texture();

    c.bench_function("mean_shift size 5 (64x64)", |b| {
        b.iter(|| {
            let mut image = black_box(source.clone());
            image
                .mean_shift_with(5, Percentage::new(10.0))
                .expect("mean-shift should succeed");
            black_box(image);
        });
    });
}

fn bench_compare(c: &mut Criterion) {
    let reference = texture();
    let mut smoothed = texture();
    smoothed
        .mean_shift(3)
        .expect("mean-shift should succeed");

    c.bench_function("compare rmse (64x64)", |b| {
        b.iter(|| {
            let distortion = black_box(&smoothed)
                .compare(black_box(&reference), ErrorMetric::RootMeanSquared)
                .expect("compare should succeed");
            black_box(distortion);
        });
    });
}

criterion_group!(benches, bench_mean_shift, bench_compare);
criterion_main!(benches);
