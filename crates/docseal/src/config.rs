//! Stamping configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file is valid:
//!
//! ```toml
//! organization = "Acme"
//! page = 1
//! scale = 0.5
//!
//! [overlay]
//! code_size = 48.0
//! error_correction = "M"
//! trail_opacity = 0.25
//! ```

use std::path::Path;

use docseal_render::CompositorConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StampError};

/// Settings for a stamping run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StampConfig {
    /// Organization written into the attestation. `-` when unset.
    pub organization: Option<String>,
    /// Target page, 1-based.
    pub page: u32,
    /// Points per signature graphic pixel.
    pub scale: f64,
    /// Overlay layout.
    pub overlay: CompositorConfig,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            organization: None,
            page: 1,
            scale: 1.0,
            overlay: CompositorConfig::default(),
        }
    }
}

impl StampConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| StampError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is in range.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(StampError::Config(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if let Some(organization) = &self.organization {
            if organization.chars().any(docseal_core::breaks_line) {
                return Err(StampError::Config(
                    "organization must be a single line".into(),
                ));
            }
        }
        self.overlay
            .validate()
            .map_err(|e| StampError::Config(e.to_string()))
    }
}
