//! Raster graphics placed on the overlay.

use image::RgbaImage;

use crate::error::{RenderError, Result};

/// A decoded signature graphic. One pixel maps to one point at scale 1.
#[derive(Debug, Clone)]
pub struct SignatureGraphic {
    image: RgbaImage,
}

impl SignatureGraphic {
    /// Decode a PNG or JPEG.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Self::from_image(image)
    }

    /// Wrap an already decoded image.
    pub fn from_image(image: RgbaImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RenderError::InvalidGraphic("graphic has no pixels".into()));
        }
        Ok(Self { image })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Intrinsic size in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Size in points at the given scale.
    pub fn scaled_size(&self, scale: f64) -> (f64, f64) {
        let (w, h) = self.dimensions();
        (f64::from(w) * scale, f64::from(h) * scale)
    }
}

/// Image data split the way PDF image XObjects want it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PdfImage {
    pub width: u32,
    pub height: u32,
    /// Packed 8-bit RGB samples.
    pub rgb: Vec<u8>,
    /// 8-bit alpha, present only if some pixel is not fully opaque.
    pub alpha: Option<Vec<u8>>,
}

impl PdfImage {
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = (width * height) as usize;
        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(pixels);

        for pixel in image.pixels() {
            let [r, g, b, a] = pixel.0;
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
        }

        let alpha = if alpha.iter().all(|&a| a == u8::MAX) {
            None
        } else {
            Some(alpha)
        };

        Self {
            width,
            height,
            rgb,
            alpha,
        }
    }
}
