// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Connected-components labelling with per-shape filtering.
//
// Regions of identical colour are labelled by `imageproc`; fully transparent
// black is background. Shape measurements come from the region's pixel
// moments. The image is replaced by a grey label map, or by the mean-colour
// image when `connected-components:mean-color` is `true`.

use image::{ImageBuffer, Rgba};
use imageproc::region_labelling::{self, Connectivity as Labelling};
use imagewerk_core::artifacts::keys;
use imagewerk_core::error::Result;
use imagewerk_core::{
    ArtifactStore, Color, ConnectedComponentsSettings, Connectivity, PointD, Threshold,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::handle::ImageHandle;

/// One labelled region and its shape measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectedComponent {
    pub id: u32,
    /// Bounding box.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Pixel count.
    pub area: u64,
    pub centroid: PointD,
    pub color: Color,
    /// Number of pixel edges shared with other regions or the border.
    pub perimeter: f64,
    /// Diameter of the circle with the same area.
    pub diameter: f64,
    /// `4 pi area / perimeter^2`; 1 for a disc.
    pub circularity: f64,
    pub major_axis: f64,
    pub minor_axis: f64,
    pub eccentricity: f64,
    /// Orientation of the major axis in degrees, clockwise from +x.
    pub angle: f64,
}

/// Running sums for one label.
#[derive(Default, Clone)]
struct Accumulator {
    area: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
    color: [f64; 4],
    perimeter: u64,
}

impl ImageHandle {
    /// Label the image's regions and return the components that pass every
    /// threshold set in `settings`, ordered by id.
    #[instrument(skip_all, fields(connectivity = ?settings.connectivity))]
    pub fn connected_components(
        &mut self,
        settings: &ConnectedComponentsSettings,
    ) -> Result<Vec<ConnectedComponent>> {
        info!("Labelling connected components");
        self.with_artifacts(settings, |image| {
            image.apply_connected_components(settings.connectivity)
        })
    }

    fn apply_connected_components(
        &mut self,
        connectivity: Connectivity,
    ) -> Result<Vec<ConnectedComponent>> {
        let filters = self.component_filters()?;
        let mean_color = self.artifact(keys::CC_MEAN_COLOR) == Some("true");

        let rgba = self.to_dynamic().into_rgba8();
        let labelling = match connectivity {
            Connectivity::Four => Labelling::Four,
            Connectivity::Eight => Labelling::Eight,
        };
        let labels = region_labelling::connected_components(&rgba, labelling, Rgba([0, 0, 0, 0]));

        let (width, height) = self.dimensions();
        let max_label = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0);
        let mut sums = vec![Accumulator::default(); max_label as usize + 1];

        for y in 0..height {
            for x in 0..width {
                let label = labels.get_pixel(x, y).0[0];
                if label == 0 {
                    continue;
                }
                let same = |dx: i64, dy: i64| {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    nx >= 0
                        && ny >= 0
                        && nx < width as i64
                        && ny < height as i64
                        && labels.get_pixel(nx as u32, ny as u32).0[0] == label
                };
                let exposed = [(-1, 0), (1, 0), (0, -1), (0, 1)]
                    .into_iter()
                    .filter(|&(dx, dy)| !same(dx, dy))
                    .count() as u64;

                let pixel = self.pixels().get_pixel(x, y).0;
                let acc = &mut sums[label as usize];
                if acc.area == 0 {
                    (acc.min_x, acc.min_y, acc.max_x, acc.max_y) = (x, y, x, y);
                }
                acc.area += 1;
                acc.min_x = acc.min_x.min(x);
                acc.min_y = acc.min_y.min(y);
                acc.max_x = acc.max_x.max(x);
                acc.max_y = acc.max_y.max(y);
                let (fx, fy) = (x as f64, y as f64);
                acc.sum_x += fx;
                acc.sum_y += fy;
                acc.sum_xx += fx * fx;
                acc.sum_yy += fy * fy;
                acc.sum_xy += fx * fy;
                for c in 0..4 {
                    acc.color[c] += pixel[c] as f64;
                }
                acc.perimeter += exposed;
            }
        }

        let mut components = Vec::new();
        let mut kept = vec![false; sums.len()];
        for (id, acc) in sums.iter().enumerate().skip(1) {
            if acc.area == 0 {
                continue;
            }
            let component = measure(id as u32, acc);
            if filters.iter().all(|(name, threshold)| threshold.contains(name.value(&component))) {
                kept[id] = true;
                components.push(component);
            } else {
                debug!(id, area = acc.area, "Component filtered out");
            }
        }

        let colors: Vec<Option<Color>> = {
            let mut colors = vec![None; sums.len()];
            for component in &components {
                colors[component.id as usize] = Some(component.color);
            }
            colors
        };
        let output = ImageBuffer::from_fn(width, height, |x, y| {
            let label = labels.get_pixel(x, y).0[0] as usize;
            if label == 0 || !kept[label] {
                return Rgba([0.0, 0.0, 0.0, 0.0]);
            }
            match colors[label] {
                Some(color) if mean_color => Rgba(color.to_f32()),
                _ => {
                    let level = label as f32 / max_label.max(1) as f32;
                    Rgba([level, level, level, 1.0])
                }
            }
        });
        self.replace_pixels(output);

        info!(
            labelled = max_label,
            kept = components.len(),
            "Connected components measured"
        );
        Ok(components)
    }

    fn component_filters(&self) -> Result<Vec<(Measure, Threshold)>> {
        let mut filters = Vec::new();
        for (measure, key) in Measure::ALL {
            if let Some(threshold) = self.parse_artifact::<Threshold>(key)? {
                filters.push((measure, threshold));
            }
        }
        Ok(filters)
    }
}

#[derive(Debug, Clone, Copy)]
enum Measure {
    Angle,
    Area,
    Circularity,
    Diameter,
    Eccentricity,
    MajorAxis,
    MinorAxis,
    Perimeter,
}

impl Measure {
    const ALL: [(Measure, &'static str); 8] = [
        (Measure::Angle, keys::CC_ANGLE_THRESHOLD),
        (Measure::Area, keys::CC_AREA_THRESHOLD),
        (Measure::Circularity, keys::CC_CIRCULARITY_THRESHOLD),
        (Measure::Diameter, keys::CC_DIAMETER_THRESHOLD),
        (Measure::Eccentricity, keys::CC_ECCENTRICITY_THRESHOLD),
        (Measure::MajorAxis, keys::CC_MAJOR_AXIS_THRESHOLD),
        (Measure::MinorAxis, keys::CC_MINOR_AXIS_THRESHOLD),
        (Measure::Perimeter, keys::CC_PERIMETER_THRESHOLD),
    ];

    fn value(self, component: &ConnectedComponent) -> f64 {
        match self {
            Measure::Angle => component.angle,
            Measure::Area => component.area as f64,
            Measure::Circularity => component.circularity,
            Measure::Diameter => component.diameter,
            Measure::Eccentricity => component.eccentricity,
            Measure::MajorAxis => component.major_axis,
            Measure::MinorAxis => component.minor_axis,
            Measure::Perimeter => component.perimeter,
        }
    }
}

fn measure(id: u32, acc: &Accumulator) -> ConnectedComponent {
    let n = acc.area as f64;
    let cx = acc.sum_x / n;
    let cy = acc.sum_y / n;

    // Central second moments; the 1/12 term treats each pixel as a unit square.
    let mu20 = acc.sum_xx / n - cx * cx + 1.0 / 12.0;
    let mu02 = acc.sum_yy / n - cy * cy + 1.0 / 12.0;
    let mu11 = acc.sum_xy / n - cx * cy;

    let spread = ((mu20 - mu02).powi(2) + 4.0 * mu11 * mu11).sqrt();
    let lambda1 = ((mu20 + mu02 + spread) / 2.0).max(0.0);
    let lambda2 = ((mu20 + mu02 - spread) / 2.0).max(0.0);

    let major_axis = 4.0 * lambda1.sqrt();
    let minor_axis = 4.0 * lambda2.sqrt();
    let eccentricity = if lambda1 > 0.0 {
        (1.0 - lambda2 / lambda1).max(0.0).sqrt()
    } else {
        0.0
    };
    let angle = if mu11.abs() < f64::EPSILON && (mu20 - mu02).abs() < f64::EPSILON {
        0.0
    } else {
        0.5 * (2.0 * mu11).atan2(mu20 - mu02).to_degrees()
    };

    let perimeter = acc.perimeter as f64;
    let circularity = if perimeter > 0.0 {
        4.0 * std::f64::consts::PI * n / (perimeter * perimeter)
    } else {
        0.0
    };

    let color = Color::from_f32([
        (acc.color[0] / n) as f32,
        (acc.color[1] / n) as f32,
        (acc.color[2] / n) as f32,
        (acc.color[3] / n) as f32,
    ]);

    ConnectedComponent {
        id,
        x: acc.min_x,
        y: acc.min_y,
        width: acc.max_x - acc.min_x + 1,
        height: acc.max_y - acc.min_y + 1,
        area: acc.area,
        centroid: PointD::new(cx, cy),
        color,
        perimeter,
        diameter: (4.0 * n / std::f64::consts::PI).sqrt(),
        circularity,
        major_axis,
        minor_axis,
        eccentricity,
        angle,
    }
}

// -- Tests --------------------------------------------------------------------
