//! The verification payload embedded in the scannable code.
//!
//! Format: `0x<hex signature> | <canonical message as text>`.
//!
//! The message bytes are turned into text one byte per character (latin-1
//! identity), never through a general decoder, so that the prefix and header
//! bytes survive and the exact signed bytes can be rebuilt from the payload.

use std::fmt;

use crate::attestation::SignedEnvelope;
use crate::crypto::RecoverableSignature;
use crate::error::{CoreError, Result};

/// Separator between the signature and the message.
pub const PAYLOAD_SEPARATOR: &str = " | ";

/// Map each byte to the character with the same code point.
pub fn latin1_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Inverse of [`latin1_text`]. Fails on characters above U+00FF.
pub fn latin1_bytes(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}

/// The string handed to the code-matrix generator.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationPayload(String);

impl VerificationPayload {
    /// Encode a signature and its framed message.
    pub fn encode(signature: &RecoverableSignature, canonical_message: &[u8]) -> Self {
        let mut text = signature.to_prefixed_hex();
        text.push_str(PAYLOAD_SEPARATOR);
        text.push_str(&latin1_text(canonical_message));
        Self(text)
    }

    /// Encode from an envelope.
    pub fn from_envelope(envelope: &SignedEnvelope) -> Self {
        Self::encode(envelope.signature(), envelope.canonical_message())
    }

    /// Split a payload back into signature and framed message bytes.
    pub fn decode(&self) -> Result<(RecoverableSignature, Vec<u8>)> {
        let (sig_text, message_text) = self
            .0
            .split_once(PAYLOAD_SEPARATOR)
            .ok_or_else(|| CoreError::MalformedEnvelope("missing payload separator".into()))?;

        let sig_hex = sig_text
            .strip_prefix("0x")
            .ok_or_else(|| CoreError::MalformedEnvelope("signature must be 0x-prefixed".into()))?;
        let sig_bytes: [u8; 65] = hex::decode(sig_hex)
            .map_err(|e| CoreError::MalformedEnvelope(e.to_string()))?
            .try_into()
            .map_err(|_| CoreError::MalformedEnvelope("signature must be 65 bytes".into()))?;

        let message = latin1_bytes(message_text)
            .ok_or_else(|| CoreError::MalformedEnvelope("message is not latin-1".into()))?;

        Ok((RecoverableSignature(sig_bytes), message))
    }

    /// The payload text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the payload text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// The message portion of the payload (after the separator).
    pub fn message_text(&self) -> &str {
        self.0
            .split_once(PAYLOAD_SEPARATOR)
            .map(|(_, message)| message)
            .unwrap_or_default()
    }
}

impl fmt::Display for VerificationPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for VerificationPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerificationPayload({} chars)", self.0.chars().count())
    }
}

impl AsRef<str> for VerificationPayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
