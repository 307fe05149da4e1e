//! Error types for stamp rendering.

use thiserror::Error;

/// Errors that can occur while building or merging an overlay.
#[derive(Debug, Error)]
pub enum RenderError {
    /// PDF parsing or writing failed.
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Image decoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The payload does not fit in the scannable code.
    #[error("payload does not fit in the code: {0}")]
    CodeCapacity(String),

    /// The target document has no pages.
    #[error("document has no pages")]
    EmptyDocument,

    /// The signature graphic is unusable.
    #[error("invalid graphic: {0}")]
    InvalidGraphic(String),

    /// The requested position or scale is unusable.
    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    /// A required page attribute is missing or malformed.
    #[error("page attribute {0} missing or malformed")]
    MissingPageAttribute(&'static str),

    /// Compositor settings are out of range.
    #[error("invalid compositor config: {0}")]
    InvalidConfig(String),

    /// Geometry rejected by the core layout.
    #[error("layout error: {0}")]
    Layout(#[from] docseal_core::CoreError),
}

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;
