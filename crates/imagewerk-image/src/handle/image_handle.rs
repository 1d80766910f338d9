// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image handle: an in-memory RGBA image together with its artifact table,
// an optional read mask, and the engine configuration. Every engine
// operation is a method on `ImageHandle`.

use std::collections::BTreeMap;
use std::str::FromStr;

use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Rgba, Rgba32FImage};
use imagewerk_core::artifacts::{
    ArtifactStore, ImageArtifacts, remove_image_artifacts, set_image_artifacts,
};
use imagewerk_core::error::{ImagewerkError, Result};
use imagewerk_core::{Color, EngineConfig};
use tracing::{debug, info, instrument, warn};

/// An image plus the string-keyed artifacts that tune engine operations.
///
/// Pixels are stored as RGBA `f32` with every channel in `0.0..=1.0`.
///
/// ```ignore
/// let mut image = ImageHandle::open("scan.png")?;
/// image.set_artifact("convolve:bias", "10%");
/// image.morphology(&MorphologySettings::new(MorphologyMethod::Convolve, kernel))?;
/// image.save("out.png")?;
/// ```
#[derive(Debug, Clone)]
pub struct ImageHandle {
    pixels: Rgba32FImage,
    artifacts: BTreeMap<String, String>,
    /// Zero marks a pixel as masked out.
    mask: Option<GrayImage>,
    config: EngineConfig,
}

impl ImageHandle {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            ImagewerkError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self::from_dynamic(img))
    }

    /// Create a handle from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data).map_err(|err| {
            ImagewerkError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self::from_dynamic(img))
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_pixels(image.to_rgba32f())
    }

    /// A `width` x `height` image filled with `color`.
    pub fn from_pixel(width: u32, height: u32, color: Color) -> Self {
        Self::from_pixels(ImageBuffer::from_pixel(width, height, Rgba(color.to_f32())))
    }

    /// Wrap a normalised RGBA `f32` buffer.
    pub fn from_pixels(pixels: Rgba32FImage) -> Self {
        Self {
            pixels,
            artifacts: BTreeMap::new(),
            mask: None,
            config: EngineConfig::default(),
        }
    }

    /// Replace the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Current `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Engine tuning used by operations on this handle.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Borrow the normalised pixel buffer.
    pub fn pixels(&self) -> &Rgba32FImage {
        &self.pixels
    }

    /// Colour of the pixel at (`x`, `y`), quantised to 8 bits.
    pub fn pixel_color(&self, x: u32, y: u32) -> Color {
        Color::from_f32(self.pixels.get_pixel(x, y).0)
    }

    /// Every artifact currently set, ordered by key.
    pub fn artifacts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.artifacts
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Install or clear the read mask. Masked-out pixels (mask value 0) are
    /// ignored by `compare`.
    pub fn set_read_mask(&mut self, mask: Option<GrayImage>) -> Result<()> {
        if let Some(mask) = &mask {
            if mask.dimensions() != self.dimensions() {
                return Err(ImagewerkError::DimensionMismatch {
                    expected: self.dimensions(),
                    actual: mask.dimensions(),
                });
            }
        }
        self.mask = mask;
        Ok(())
    }

    pub fn read_mask(&self) -> Option<&GrayImage> {
        self.mask.as_ref()
    }

    /// Whether the pixel at (`x`, `y`) takes part in masked operations.
    pub(crate) fn is_unmasked(&self, x: u32, y: u32) -> bool {
        self.mask
            .as_ref()
            .is_none_or(|mask| mask.get_pixel(x, y).0[0] > 0)
    }

    /// Swap in a new pixel buffer. A read mask that no longer fits is dropped.
    pub(crate) fn replace_pixels(&mut self, pixels: Rgba32FImage) {
        if self
            .mask
            .as_ref()
            .is_some_and(|mask| mask.dimensions() != pixels.dimensions())
        {
            debug!("Dropping read mask after resize");
            self.mask = None;
        }
        self.pixels = pixels;
    }

    /// A new handle with `pixels` and this handle's configuration, but no
    /// artifacts or mask.
    pub(crate) fn derive(&self, pixels: Rgba32FImage) -> Self {
        Self::from_pixels(pixels).with_config(self.config.clone())
    }

    // -- Artifacts ------------------------------------------------------------

    /// Parse the artifact `key` as `T`. A missing artifact is `Ok(None)`;
    /// text that does not parse is `InvalidArtifact`.
    pub(crate) fn parse_artifact<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.artifacts.get(key) else {
            return Ok(None);
        };
        value.trim().parse::<T>().map(Some).map_err(|_| {
            warn!(key, value = %value, "Unparsable artifact");
            ImagewerkError::InvalidArtifact {
                key: key.to_owned(),
                value: value.clone(),
            }
        })
    }

    /// Run `operation` with the artifacts of `settings` applied, removing
    /// them afterwards whether or not the operation succeeded.
    pub(crate) fn with_artifacts<S, T>(
        &mut self,
        settings: &S,
        operation: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T>
    where
        S: ImageArtifacts + ?Sized,
    {
        set_image_artifacts(self, settings);
        let result = operation(self);
        remove_image_artifacts(self, settings);
        result
    }

    // -- Output ---------------------------------------------------------------

    /// The image as an 8-bit `DynamicImage`.
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgba32F(self.pixels.clone()).into_rgba8().into()
    }

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.to_dynamic()
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| ImagewerkError::ImageError(format!("image encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.to_dynamic().save(path.as_ref()).map_err(|err| {
            ImagewerkError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

impl ArtifactStore for ImageHandle {
    fn set_artifact(&mut self, key: &str, value: &str) {
        self.artifacts.set_artifact(key, value);
    }

    fn remove_artifact(&mut self, key: &str) {
        self.artifacts.remove_artifact(key);
    }

    fn artifact(&self, key: &str) -> Option<&str> {
        self.artifacts.artifact(key)
    }
}
