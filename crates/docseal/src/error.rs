//! Error types for the stamping pipeline.
//!
//! Every variant names the pipeline stage that failed.

use docseal_core::CoreError;
use docseal_render::RenderError;
use thiserror::Error;

/// Errors that can occur while stamping a document.
#[derive(Debug, Error)]
pub enum StampError {
    /// The input could not be read for hashing.
    #[error("hashing failed: {0}")]
    Hashing(#[source] std::io::Error),

    /// Bad key or signer rejection.
    #[error("signing failed: {0}")]
    Signing(#[source] CoreError),

    /// The payload does not fit the scannable code.
    #[error("encoding failed: {0}")]
    Encoding(#[source] RenderError),

    /// Overlay construction or merge failed (bad graphic, zero pages, ...).
    #[error("composition failed: {0}")]
    Composition(#[source] RenderError),

    /// Invalid settings.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading inputs or writing the output failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl StampError {
    /// Name of the failed stage.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Hashing(_) => "hashing",
            Self::Signing(_) => "signing",
            Self::Encoding(_) => "encoding",
            Self::Composition(_) => "composition",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }
}

impl From<RenderError> for StampError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::CodeCapacity(_) => Self::Encoding(err),
            RenderError::InvalidConfig(msg) => Self::Config(msg),
            other => Self::Composition(other),
        }
    }
}

impl From<CoreError> for StampError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidAttestation(msg) => Self::Config(msg),
            other => Self::Signing(other),
        }
    }
}

/// Result type for stamping operations.
pub type Result<T> = std::result::Result<T, StampError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_errors_map_to_stages() {
        let capacity: StampError = RenderError::CodeCapacity("too long".into()).into();
        assert_eq!(capacity.stage(), "encoding");

        let empty: StampError = RenderError::EmptyDocument.into();
        assert_eq!(empty.stage(), "composition");
        assert_eq!(empty.to_string(), "composition failed: document has no pages");

        let config: StampError = RenderError::InvalidConfig("bad".into()).into();
        assert_eq!(config.stage(), "config");
    }

    #[test]
    fn test_core_errors_map_to_stages() {
        let key: StampError = CoreError::InvalidKey("short".into()).into();
        assert_eq!(key.stage(), "signing");
        assert!(key.to_string().starts_with("signing failed"));

        let org: StampError = CoreError::InvalidAttestation("newline".into()).into();
        assert_eq!(org.stage(), "config");
    }
}
