// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core value types for Imagewerk: colours, percentages, geometries,
// thresholds, kernels, and the keyword enums used by engine operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ImagewerkError, Result};

// -- Color --------------------------------------------------------------------

/// An 8-bit RGBA colour.
///
/// Serialised as its string form (`#RRGGBB` / `#RRGGBBAA`) so settings files
/// can spell colours the same way artifacts do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Default colour painted over differing pixels by `compare`.
    pub const HIGHLIGHT: Color = Color::rgba(241, 0, 30, 204);
    /// Default colour painted over matching pixels by `compare`.
    pub const LOWLIGHT: Color = Color::rgba(255, 255, 255, 204);
    /// Default colour painted over masked-out pixels by `compare`.
    pub const MASKLIGHT: Color = Color::rgba(136, 136, 136, 204);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels normalised to `0.0..=1.0`.
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Build a colour from normalised channels, clamping out-of-range values.
    pub fn from_f32(channels: [f32; 4]) -> Self {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgba(
            quantize(channels[0]),
            quantize(channels[1]),
            quantize(channels[2]),
            quantize(channels[3]),
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = ImagewerkError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let lower = text.to_ascii_lowercase();
        let invalid = || ImagewerkError::InvalidColor(text.to_owned());

        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_args(args, true).ok_or_else(invalid);
        }
        if let Some(args) = lower
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_args(args, false).ok_or_else(invalid);
        }
        named_color(&lower).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Color {
    type Error = ImagewerkError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb_args(args: &str, with_alpha: bool) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    let a = if with_alpha {
        let alpha = parts[3].parse::<f64>().ok()?;
        if !(0.0..=1.0).contains(&alpha) {
            return None;
        }
        (alpha * 255.0).round() as u8
    } else {
        255
    };
    Some(Color::rgba(r, g, b, a))
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name {
        "none" | "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" => Color::rgb(0, 255, 255),
        "magenta" => Color::rgb(255, 0, 255),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        _ => return None,
    };
    Some(color)
}

// -- Percentage ---------------------------------------------------------------

/// A percentage value such as `80%`. Stored as the percent number, not the
/// fraction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(pub f64);

impl Percentage {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// The percentage as a fraction (`80%` -> `0.8`).
    pub fn fraction(&self) -> f64 {
        self.0 / 100.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for Percentage {
    type Err = ImagewerkError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let number = text.strip_suffix('%').unwrap_or(text).trim();
        number
            .parse::<f64>()
            .map(Self)
            .map_err(|_| ImagewerkError::InvalidPercentage(text.to_owned()))
    }
}

// -- Geometry -----------------------------------------------------------------

/// A point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointD {
    pub x: f64,
    pub y: f64,
}

impl PointD {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in `WxH+X+Y` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
}

impl Geometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: 0,
        }
    }

    pub fn with_offset(width: u32, height: u32, x: i32, y: i32) -> Self {
        Self {
            width,
            height,
            x,
            y,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}{:+}{:+}", self.width, self.height, self.x, self.y)
    }
}

impl FromStr for Geometry {
    type Err = ImagewerkError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = || ImagewerkError::InvalidGeometry(text.to_owned());

        let (size, offsets) = match text.find(['+', '-']) {
            Some(index) => text.split_at(index),
            None => (text, ""),
        };
        let (width, height) = size.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = width.parse::<u32>().map_err(|_| invalid())?;
        let height = height.parse::<u32>().map_err(|_| invalid())?;

        if offsets.is_empty() {
            return Ok(Self::new(width, height));
        }

        // Offsets always carry their sign: "+X+Y", "-X+Y", ...
        let second = offsets[1..]
            .find(['+', '-'])
            .map(|index| index + 1)
            .ok_or_else(invalid)?;
        let (x, y) = offsets.split_at(second);
        let x = x.parse::<i32>().map_err(|_| invalid())?;
        let y = y.parse::<i32>().map_err(|_| invalid())?;
        Ok(Self::with_offset(width, height, x, y))
    }
}

impl TryFrom<String> for Geometry {
    type Error = ImagewerkError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Geometry> for String {
    fn from(geometry: Geometry) -> Self {
        geometry.to_string()
    }
}

// -- Threshold ----------------------------------------------------------------

/// An inclusive lower bound with an optional upper bound, written `min` or
/// `min-max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub minimum: f64,
    pub maximum: Option<f64>,
}

impl Threshold {
    pub fn new(minimum: f64) -> Self {
        Self {
            minimum,
            maximum: None,
        }
    }

    pub fn range(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum,
            maximum: Some(maximum),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum && self.maximum.is_none_or(|max| value <= max)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.maximum {
            Some(max) => write!(f, "{}-{}", self.minimum, max),
            None => write!(f, "{}", self.minimum),
        }
    }
}

impl FromStr for Threshold {
    type Err = ImagewerkError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = || ImagewerkError::InvalidArgument(format!("invalid threshold: {text}"));
        if text.is_empty() {
            return Err(invalid());
        }

        // The minimum may itself be negative, so skip a leading sign.
        let split = text
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '-')
            .map(|(index, _)| index);
        match split {
            Some(split) => {
                let minimum = text[..split].parse::<f64>().map_err(|_| invalid())?;
                let maximum = text[split + 1..].parse::<f64>().map_err(|_| invalid())?;
                Ok(Self::range(minimum, maximum))
            }
            None => text.parse::<f64>().map(Self::new).map_err(|_| invalid()),
        }
    }
}

// -- Keyword enums ------------------------------------------------------------

/// Distortion metric used by `compare`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorMetric {
    /// Number of pixels that differ beyond the configured fuzz.
    Absolute,
    MeanAbsolute,
    MeanSquared,
    #[default]
    RootMeanSquared,
    PeakAbsolute,
    PeakSignalToNoiseRatio,
    NormalizedCrossCorrelation,
}

impl FromStr for ErrorMetric {
    type Err = ImagewerkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ae" | "absolute" => Ok(Self::Absolute),
            "mae" | "mean-absolute" => Ok(Self::MeanAbsolute),
            "mse" | "mean-squared" => Ok(Self::MeanSquared),
            "rmse" | "root-mean-squared" => Ok(Self::RootMeanSquared),
            "pae" | "peak-absolute" => Ok(Self::PeakAbsolute),
            "psnr" | "peak-signal-to-noise-ratio" => Ok(Self::PeakSignalToNoiseRatio),
            "ncc" | "normalized-cross-correlation" => Ok(Self::NormalizedCrossCorrelation),
            other => Err(ImagewerkError::UnknownKeyword {
                kind: "error metric",
                value: other.to_owned(),
            }),
        }
    }
}

/// Arithmetic applied to complex images stored as real/imaginary pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplexOperator {
    #[default]
    Add,
    Subtract,
    Multiply,
    Divide,
    Conjugate,
}

/// Neighbourhood used when labelling connected components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Connectivity {
    Four,
    #[default]
    Eight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistortMethod {
    #[default]
    ScaleRotateTranslate,
    Affine,
}

impl FromStr for DistortMethod {
    type Err = ImagewerkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "srt" | "scale-rotate-translate" => Ok(Self::ScaleRotateTranslate),
            "affine" => Ok(Self::Affine),
            other => Err(ImagewerkError::UnknownKeyword {
                kind: "distort method",
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MorphologyMethod {
    #[default]
    Convolve,
    Erode,
    Dilate,
    Open,
    Close,
}

// -- Kernels ------------------------------------------------------------------

/// A morphology / convolution kernel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Kernel {
    #[default]
    Unity,
    Square { radius: u32 },
    Diamond { radius: u32 },
    Gaussian { sigma: f64 },
    Custom {
        width: u32,
        height: u32,
        values: Vec<f64>,
    },
}

/// Upper bound on the number of cells in a kernel.
pub const MAX_KERNEL_CELLS: u64 = 1 << 24;

impl Kernel {
    /// Width and height in cells. Saturates at `u32::MAX` for radii that do
    /// not fit; [`Kernel::validate`] rejects those.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Unity => (1, 1),
            Self::Square { radius } | Self::Diamond { radius } => {
                let side = side_for(*radius);
                (side, side)
            }
            Self::Gaussian { sigma } => {
                let side = side_for(gaussian_radius(*sigma));
                (side, side)
            }
            Self::Custom { width, height, .. } => (*width, *height),
        }
    }

    /// Check that the kernel describes a non-empty, bounded grid of cells
    /// with a value for each one.
    pub fn validate(&self) -> Result<()> {
        if let Self::Gaussian { sigma } = self {
            if !(sigma.is_finite() && *sigma > 0.0) {
                return Err(ImagewerkError::InvalidArgument(format!(
                    "gaussian kernel sigma must be positive, got {sigma}"
                )));
            }
        }
        let radius = match self {
            Self::Square { radius } | Self::Diamond { radius } => Some(*radius),
            Self::Gaussian { sigma } => Some(gaussian_radius(*sigma)),
            _ => None,
        };
        if radius.is_some_and(|r| r.checked_mul(2).and_then(|d| d.checked_add(1)).is_none()) {
            return Err(ImagewerkError::InvalidArgument(format!(
                "kernel {self} is too large"
            )));
        }

        let (width, height) = self.dimensions();
        let cells = width as u64 * height as u64;
        if cells == 0 || cells > MAX_KERNEL_CELLS {
            return Err(ImagewerkError::InvalidArgument(format!(
                "kernel {width}x{height} must have between 1 and {MAX_KERNEL_CELLS} cells"
            )));
        }
        if let Self::Custom { values, .. } = self {
            if values.len() as u64 != cells {
                return Err(ImagewerkError::InvalidArgument(format!(
                    "kernel has {} values for {width}x{height} cells",
                    values.len()
                )));
            }
        }
        Ok(())
    }

    /// Row-major kernel values. Only meaningful for a kernel that passes
    /// [`Kernel::validate`].
    pub fn values(&self) -> Vec<f64> {
        match self {
            Self::Unity => vec![1.0],
            Self::Square { .. } => {
                let (side, _) = self.dimensions();
                vec![1.0; side as usize * side as usize]
            }
            Self::Diamond { radius } => {
                let r = *radius as i64;
                let mut values = Vec::new();
                for dy in -r..=r {
                    for dx in -r..=r {
                        values.push(if dx.abs() + dy.abs() <= r { 1.0 } else { 0.0 });
                    }
                }
                values
            }
            Self::Gaussian { sigma } => {
                let r = gaussian_radius(*sigma) as i64;
                let two_sigma_sq = 2.0 * sigma * sigma;
                let mut values = Vec::new();
                for dy in -r..=r {
                    for dx in -r..=r {
                        let d2 = (dx * dx + dy * dy) as f64;
                        values.push((-d2 / two_sigma_sq).exp());
                    }
                }
                let sum: f64 = values.iter().sum();
                values.iter().map(|v| v / sum).collect()
            }
            Self::Custom { values, .. } => values.clone(),
        }
    }
}

fn side_for(radius: u32) -> u32 {
    radius.saturating_mul(2).saturating_add(1)
}

fn gaussian_radius(sigma: f64) -> u32 {
    ((3.0 * sigma).ceil() as u32).max(1)
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unity => write!(f, "Unity"),
            Self::Square { radius } => write!(f, "Square:{radius}"),
            Self::Diamond { radius } => write!(f, "Diamond:{radius}"),
            Self::Gaussian { sigma } => write!(f, "Gaussian:0x{sigma}"),
            Self::Custom {
                width,
                height,
                values,
            } => {
                let joined: Vec<String> = values.iter().map(f64::to_string).collect();
                write!(f, "{width}x{height}:{}", joined.join(","))
            }
        }
    }
}

/// Kernel scaling applied before a convolution: `factor`, or `factor!` to
/// normalise the kernel first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvolveScale {
    pub factor: f64,
    pub normalize: bool,
}

impl ConvolveScale {
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            normalize: false,
        }
    }

    pub fn normalized(factor: f64) -> Self {
        Self {
            factor,
            normalize: true,
        }
    }
}

impl fmt::Display for ConvolveScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.normalize {
            write!(f, "{}!", self.factor)
        } else {
            write!(f, "{}", self.factor)
        }
    }
}

impl FromStr for ConvolveScale {
    type Err = ImagewerkError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let (body, normalize) = match text.strip_suffix('!') {
            Some(body) => (body.trim(), true),
            None => (text, false),
        };
        let factor = if body.is_empty() {
            1.0
        } else if let Some(percent) = body.strip_suffix('%') {
            percent.trim().parse::<f64>().map(|v| v / 100.0).map_err(|_| {
                ImagewerkError::InvalidArgument(format!("invalid convolve scale: {text}"))
            })?
        } else {
            body.parse::<f64>().map_err(|_| {
                ImagewerkError::InvalidArgument(format!("invalid convolve scale: {text}"))
            })?
        };
        Ok(Self { factor, normalize })
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_hex_forms() {
        assert_eq!("#f00".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
        assert_eq!("#00FF80".parse::<Color>().unwrap(), Color::rgb(0, 255, 128));
        assert_eq!(
            "#11223344".parse::<Color>().unwrap(),
            Color::rgba(0x11, 0x22, 0x33, 0x44)
        );
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
    }

    #[test]
    fn color_parses_functional_and_named_forms() {
        assert_eq!("rgb(1, 2, 3)".parse::<Color>().unwrap(), Color::rgb(1, 2, 3));
        assert_eq!(
            "rgba(241,0,30,0.8)".parse::<Color>().unwrap(),
            Color::HIGHLIGHT
        );
        assert_eq!(" Purple ".parse::<Color>().unwrap(), Color::rgb(128, 0, 128));
        assert_eq!("none".parse::<Color>().unwrap(), Color::TRANSPARENT);
        assert!("rgba(1,2,3,1.5)".parse::<Color>().is_err());
        assert!("chartreuse-ish".parse::<Color>().is_err());
    }

    #[test]
    fn color_display_omits_opaque_alpha() {
        assert_eq!(Color::rgb(255, 0, 16).to_string(), "#FF0010");
        assert_eq!(Color::rgba(255, 0, 16, 128).to_string(), "#FF001080");
        let back: Color = Color::LOWLIGHT.to_string().parse().unwrap();
        assert_eq!(back, Color::LOWLIGHT);
    }

    #[test]
    fn color_serializes_as_string() {
        let json = serde_json::to_string(&Color::rgb(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: Color = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(back, Color::rgb(255, 0, 0));
    }

    #[test]
    fn percentage_display_and_parse() {
        assert_eq!(Percentage::new(80.0).to_string(), "80%");
        assert_eq!(Percentage::new(12.5).to_string(), "12.5%");
        assert_eq!("40%".parse::<Percentage>().unwrap(), Percentage::new(40.0));
        assert_eq!("7".parse::<Percentage>().unwrap(), Percentage::new(7.0));
        assert!((Percentage::new(80.0).fraction() - 0.8).abs() < 1e-12);
        assert!("abc%".parse::<Percentage>().is_err());
    }

    #[test]
    fn geometry_display_spells_out_signs() {
        assert_eq!(Geometry::new(100, 50).to_string(), "100x50+0+0");
        assert_eq!(
            Geometry::with_offset(100, 50, -3, 4).to_string(),
            "100x50-3+4"
        );
    }

    #[test]
    fn geometry_parses_with_and_without_offsets() {
        assert_eq!("64x32".parse::<Geometry>().unwrap(), Geometry::new(64, 32));
        assert_eq!(
            "64x32-5-6".parse::<Geometry>().unwrap(),
            Geometry::with_offset(64, 32, -5, -6)
        );
        assert_eq!(
            "64X32+5+0".parse::<Geometry>().unwrap(),
            Geometry::with_offset(64, 32, 5, 0)
        );
        assert!("64x".parse::<Geometry>().is_err());
        assert!("64x32+5".parse::<Geometry>().is_err());
    }

    #[test]
    fn threshold_display_and_contains() {
        assert_eq!(Threshold::new(10.0).to_string(), "10");
        assert_eq!(Threshold::range(1.5, 20.0).to_string(), "1.5-20");

        let range = Threshold::range(5.0, 10.0);
        assert!(range.contains(5.0));
        assert!(range.contains(10.0));
        assert!(!range.contains(10.5));
        assert!(Threshold::new(5.0).contains(1e9));
    }

    #[test]
    fn threshold_parses_negative_minimum() {
        assert_eq!(
            "-45-45".parse::<Threshold>().unwrap(),
            Threshold::range(-45.0, 45.0)
        );
        assert_eq!("-3".parse::<Threshold>().unwrap(), Threshold::new(-3.0));
        assert!("".parse::<Threshold>().is_err());
    }

    #[test]
    fn kernel_values_match_dimensions() {
        for kernel in [
            Kernel::Unity,
            Kernel::Square { radius: 2 },
            Kernel::Diamond { radius: 1 },
            Kernel::Gaussian { sigma: 1.0 },
        ] {
            let (w, h) = kernel.dimensions();
            assert_eq!(kernel.values().len(), (w * h) as usize, "{kernel}");
        }
    }

    #[test]
    fn kernel_validation_rejects_bad_sigma() {
        for sigma in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Kernel::Gaussian { sigma }.validate().unwrap_err();
            assert!(matches!(err, ImagewerkError::InvalidArgument(_)), "{sigma}");
        }
        assert!(Kernel::Gaussian { sigma: 0.5 }.validate().is_ok());
    }

    #[test]
    fn kernel_validation_rejects_oversized_grids() {
        for kernel in [
            Kernel::Square { radius: u32::MAX },
            Kernel::Diamond { radius: u32::MAX / 2 },
            Kernel::Square { radius: 5000 },
            Kernel::Gaussian { sigma: 1e12 },
            Kernel::Custom {
                width: 65536,
                height: 65536,
                values: vec![],
            },
        ] {
            let err = kernel.validate().unwrap_err();
            assert!(matches!(err, ImagewerkError::InvalidArgument(_)), "{kernel}");
        }
        assert_eq!(Kernel::Square { radius: u32::MAX }.dimensions(), (u32::MAX, u32::MAX));
    }

    #[test]
    fn custom_kernel_needs_a_value_per_cell() {
        let short = Kernel::Custom {
            width: 2,
            height: 2,
            values: vec![1.0; 3],
        };
        assert!(short.validate().is_err());
        let empty = Kernel::Custom {
            width: 0,
            height: 3,
            values: vec![],
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn diamond_kernel_shape() {
        let values = Kernel::Diamond { radius: 1 }.values();
        assert_eq!(values, vec![0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn gaussian_kernel_is_normalised() {
        let sum: f64 = Kernel::Gaussian { sigma: 1.5 }.values().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn kernel_display() {
        assert_eq!(Kernel::Square { radius: 1 }.to_string(), "Square:1");
        assert_eq!(Kernel::Gaussian { sigma: 1.5 }.to_string(), "Gaussian:0x1.5");
        let custom = Kernel::Custom {
            width: 2,
            height: 1,
            values: vec![1.0, -0.5],
        };
        assert_eq!(custom.to_string(), "2x1:1,-0.5");
    }

    #[test]
    fn convolve_scale_round_trips_normalize_flag() {
        assert_eq!(ConvolveScale::normalized(0.5).to_string(), "0.5!");
        assert_eq!(
            "0.5!".parse::<ConvolveScale>().unwrap(),
            ConvolveScale::normalized(0.5)
        );
        assert_eq!("!".parse::<ConvolveScale>().unwrap(), ConvolveScale::normalized(1.0));
        assert_eq!("50%".parse::<ConvolveScale>().unwrap(), ConvolveScale::new(0.5));
    }

    #[test]
    fn error_metric_short_names() {
        assert_eq!("RMSE".parse::<ErrorMetric>().unwrap(), ErrorMetric::RootMeanSquared);
        assert_eq!("ae".parse::<ErrorMetric>().unwrap(), ErrorMetric::Absolute);
        assert!("fuzzy".parse::<ErrorMetric>().is_err());
    }
}
