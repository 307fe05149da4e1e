//! Error types for docseal core.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("signer rejected message: {0}")]
    Signing(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid attestation: {0}")]
    InvalidAttestation(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("invalid content identifier: {0}")]
    InvalidIdentifier(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
