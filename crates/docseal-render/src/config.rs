//! Compositor settings.

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }
}

/// Where and how the stamp elements are drawn. Lengths are in PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Side of the square code graphic.
    pub code_size: f64,
    /// Horizontal offset of the code from the stamp position.
    pub code_offset_x: f64,
    /// Apply a rounded-corner soft mask to the code.
    pub round_code_corners: bool,
    /// Corner radius of the code mask.
    pub code_corner_radius: f64,
    /// QR error-correction level.
    pub error_correction: ErrorCorrection,
    /// Gap between the code and the perimeter trail.
    pub trail_margin: f64,
    /// Corner radius of the trail path.
    pub trail_corner_radius: f64,
    /// Font size of trail characters (Courier).
    pub trail_font_size: f64,
    /// Opacity of the trail.
    pub trail_opacity: f64,
    /// Character appended after each repetition of the trail text.
    pub filler: char,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            code_size: 48.0,
            code_offset_x: 16.0,
            round_code_corners: true,
            code_corner_radius: 4.0,
            error_correction: ErrorCorrection::M,
            trail_margin: 4.0,
            trail_corner_radius: 3.0,
            trail_font_size: 2.5,
            trail_opacity: 0.25,
            filler: docseal_core::FILLER,
        }
    }
}

impl CompositorConfig {
    /// Check that every setting is in range.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("code_size", self.code_size),
            ("trail_font_size", self.trail_font_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(RenderError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("code_corner_radius", self.code_corner_radius),
            ("trail_margin", self.trail_margin),
            ("trail_corner_radius", self.trail_corner_radius),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(RenderError::InvalidConfig(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        if !self.code_offset_x.is_finite() {
            return Err(RenderError::InvalidConfig("code_offset_x must be finite".into()));
        }
        if !(self.trail_opacity > 0.0 && self.trail_opacity <= 1.0) {
            return Err(RenderError::InvalidConfig(format!(
                "trail_opacity must be in (0, 1], got {}",
                self.trail_opacity
            )));
        }
        if 2.0 * self.code_corner_radius > self.code_size {
            return Err(RenderError::InvalidConfig(
                "code_corner_radius exceeds half the code size".into(),
            ));
        }
        let ring = self.code_size + 2.0 * self.trail_margin;
        if 2.0 * self.trail_corner_radius >= ring {
            return Err(RenderError::InvalidConfig(format!(
                "trail_corner_radius {} must be below half of the trail ring side {ring}",
                self.trail_corner_radius
            )));
        }
        Ok(())
    }
}
