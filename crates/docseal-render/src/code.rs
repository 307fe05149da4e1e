//! Scannable code generation.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use qrcode::{Color, QrCode};

use crate::config::ErrorCorrection;
use crate::error::{RenderError, Result};

/// Turns a payload string into a code matrix image.
pub trait CodeMatrixEncoder {
    /// Encode the payload. Fails if it exceeds the code's capacity.
    fn encode(&self, payload: &str) -> Result<GrayImage>;
}

/// QR code encoder.
#[derive(Debug, Clone)]
pub struct QrEncoder {
    level: ErrorCorrection,
    module_pixels: u32,
    quiet_zone: u32,
}

impl QrEncoder {
    /// An encoder at the given error-correction level.
    pub fn new(level: ErrorCorrection) -> Self {
        Self {
            level,
            module_pixels: 4,
            quiet_zone: 2,
        }
    }

    /// Pixels per module side.
    pub fn module_pixels(mut self, pixels: u32) -> Self {
        self.module_pixels = pixels.max(1);
        self
    }

    /// Light border width, in modules.
    pub fn quiet_zone(mut self, modules: u32) -> Self {
        self.quiet_zone = modules;
        self
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new(ErrorCorrection::default())
    }
}

impl CodeMatrixEncoder for QrEncoder {
    fn encode(&self, payload: &str) -> Result<GrayImage> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), self.level.into())
            .map_err(|e| RenderError::CodeCapacity(e.to_string()))?;

        let width = code.width() as u32;
        let colors = code.to_colors();
        let modules = width + 2 * self.quiet_zone;
        let side = modules * self.module_pixels;
        let quiet = self.quiet_zone;

        Ok(GrayImage::from_fn(side, side, |px, py| {
            let mx = px / self.module_pixels;
            let my = py / self.module_pixels;
            let inside = mx >= quiet && my >= quiet && mx < quiet + width && my < quiet + width;
            if !inside {
                return Luma([255]);
            }
            let index = ((my - quiet) * width + (mx - quiet)) as usize;
            match colors[index] {
                Color::Dark => Luma([0]),
                Color::Light => Luma([255]),
            }
        }))
    }
}

/// Convert a code image to RGBA, optionally clearing alpha outside a rounded
/// rectangle of `radius_px`.
pub fn with_rounded_corners(code: &GrayImage, radius_px: Option<f64>) -> RgbaImage {
    let (w, h) = code.dimensions();
    RgbaImage::from_fn(w, h, |x, y| {
        let Luma([v]) = *code.get_pixel(x, y);
        let alpha = match radius_px {
            Some(r) if r > 0.0 && outside_rounded_rect(x, y, w, h, r) => 0,
            _ => 255,
        };
        Rgba([v, v, v, alpha])
    })
}

/// Whether the center of pixel `(x, y)` lies in a cut-off corner.
fn outside_rounded_rect(x: u32, y: u32, w: u32, h: u32, r: f64) -> bool {
    let cx = f64::from(x) + 0.5;
    let cy = f64::from(y) + 0.5;
    let (w, h) = (f64::from(w), f64::from(h));

    let corner_x = if cx < r {
        r
    } else if cx > w - r {
        w - r
    } else {
        return false;
    };
    let corner_y = if cy < r {
        r
    } else if cy > h - r {
        h - r
    } else {
        return false;
    };

    (cx - corner_x).hypot(cy - corner_y) > r
}
