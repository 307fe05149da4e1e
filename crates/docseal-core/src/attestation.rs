//! Attestations and their signed envelope.
//!
//! An attestation binds a content identifier to a signer, a timestamp and an
//! organization. It is rendered as one line of text:
//!
//! ```text
//! <cid> <checksummed-address> <timestamp-millis> <organization>
//! ```
//!
//! The line is framed as a personal message before signing:
//!
//! ```text
//! "\x19Ethereum Signed Message:\n" || decimal(len(text)) || text
//! ```
//!
//! **CRITICAL**: external verifiers rebuild exactly these bytes to recover the
//! signer. Any change to the framing invalidates every issued stamp.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cid::ContentIdentifier;
use crate::crypto::{Address, RecoverableSignature, Signer};
use crate::error::{CoreError, Result};

/// Domain separation prefix for personal messages.
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Organization used when none is given.
pub const DEFAULT_ORGANIZATION: &str = "-";

/// Frame a message as a personal message: prefix, decimal length, body.
pub fn personal_message(body: &[u8]) -> Vec<u8> {
    let header = body.len().to_string();
    let mut msg = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + header.len() + body.len());
    msg.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
    msg.extend_from_slice(header.as_bytes());
    msg.extend_from_slice(body);
    msg
}

/// The fields bound together by a stamp signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// Identifier of the original document bytes.
    pub identifier: ContentIdentifier,
    /// Address of the signer.
    pub signer: Address,
    /// Signing time in Unix milliseconds.
    pub timestamp_millis: u64,
    /// Issuing organization, `-` when unspecified.
    pub organization: String,
}

impl Attestation {
    /// Render the canonical single-line text.
    pub fn canonical_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.identifier,
            self.signer.to_checksum(),
            self.timestamp_millis,
            self.organization
        )
    }

    /// Parse canonical text back into an attestation.
    pub fn parse(text: &str) -> Result<Self> {
        let mut fields = text.splitn(4, ' ');
        let mut next = |name: &str| {
            fields
                .next()
                .ok_or_else(|| CoreError::InvalidAttestation(format!("missing {name}")))
        };

        let identifier = next("identifier")?.parse()?;
        let signer = next("signer")?.parse()?;
        let timestamp_millis = next("timestamp")?
            .parse()
            .map_err(|e| CoreError::InvalidAttestation(format!("timestamp: {e}")))?;
        let organization = next("organization")?.to_string();
        validate_organization(&organization)?;

        Ok(Self {
            identifier,
            signer,
            timestamp_millis,
            organization,
        })
    }
}

fn validate_organization(organization: &str) -> Result<()> {
    if organization.is_empty() {
        return Err(CoreError::InvalidAttestation("empty organization".into()));
    }
    if organization.chars().any(breaks_line) {
        return Err(CoreError::InvalidAttestation(
            "organization must be a single line".into(),
        ));
    }
    Ok(())
}

/// Whether `c` would split the one-line attestation text.
pub fn breaks_line(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}')
}

/// A signature plus the exact bytes that were signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    signature: RecoverableSignature,
    canonical_message: Vec<u8>,
}

impl SignedEnvelope {
    /// Assemble an envelope from its parts.
    pub fn new(signature: RecoverableSignature, canonical_message: Vec<u8>) -> Self {
        Self {
            signature,
            canonical_message,
        }
    }

    /// The 65-byte signature.
    pub fn signature(&self) -> &RecoverableSignature {
        &self.signature
    }

    /// The framed bytes that were hashed for signing.
    pub fn canonical_message(&self) -> &[u8] {
        &self.canonical_message
    }

    /// Strip the prefix and length header, returning the attestation text.
    pub fn attestation_text(&self) -> Result<String> {
        let body = unframe(&self.canonical_message)?;
        String::from_utf8(body.to_vec())
            .map_err(|e| CoreError::MalformedEnvelope(format!("body is not UTF-8: {e}")))
    }
}

/// Split a personal message into its body.
///
/// The decimal header is read as the unique prefix whose value equals the
/// number of bytes that follow it.
fn unframe(message: &[u8]) -> Result<&[u8]> {
    let rest = message
        .strip_prefix(PERSONAL_MESSAGE_PREFIX)
        .ok_or_else(|| CoreError::MalformedEnvelope("missing personal message prefix".into()))?;

    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    for split in 1..=digits {
        let header = &rest[..split];
        if split > 1 && header[0] == b'0' {
            break;
        }
        let declared: usize = std::str::from_utf8(header)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CoreError::MalformedEnvelope("length header overflow".into()))?;
        if declared == rest.len() - split {
            return Ok(&rest[split..]);
        }
    }

    Err(CoreError::MalformedEnvelope(
        "length header does not match body".into(),
    ))
}

/// Builder for signed attestations.
pub struct AttestationBuilder {
    identifier: ContentIdentifier,
    timestamp_millis: u64,
    organization: Option<String>,
}

impl AttestationBuilder {
    /// Start building an attestation over a content identifier.
    pub fn new(identifier: ContentIdentifier) -> Self {
        Self {
            identifier,
            timestamp_millis: 0,
            organization: None,
        }
    }

    /// Set the timestamp (Unix milliseconds).
    pub fn timestamp(mut self, millis: u64) -> Self {
        self.timestamp_millis = millis;
        self
    }

    /// Set the organization. An empty string means unspecified.
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        let organization = organization.into();
        self.organization = if organization.is_empty() {
            None
        } else {
            Some(organization)
        };
        self
    }

    /// Build the attestation, frame it, and sign it.
    ///
    /// Fails with [`CoreError::InvalidAttestation`] for a multi-line
    /// organization, or with whatever the signer reports.
    pub fn sign<S: Signer + ?Sized>(self, signer: &S) -> Result<(Attestation, SignedEnvelope)> {
        let organization = self
            .organization
            .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string());
        validate_organization(&organization)?;

        let attestation = Attestation {
            identifier: self.identifier,
            signer: signer.address(),
            timestamp_millis: self.timestamp_millis,
            organization,
        };

        let text = attestation.canonical_text();
        let canonical_message = personal_message(text.as_bytes());
        debug!(
            signer = %attestation.signer,
            len = canonical_message.len(),
            "framed attestation"
        );

        let signature = signer.sign(&canonical_message)?;
        Ok((attestation, SignedEnvelope::new(signature, canonical_message)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cid::identify;
    use crate::crypto::LocalSigner;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    struct RejectingSigner;

    impl Signer for RejectingSigner {
        fn address(&self) -> Address {
            Address::from_bytes([0x11; 20])
        }

        fn sign(&self, _message: &[u8]) -> Result<RecoverableSignature> {
            Err(CoreError::Signing("hardware wallet locked".into()))
        }
    }

    fn signer() -> LocalSigner {
        LocalSigner::from_hex(DEV_KEY).unwrap()
    }

    #[test]
    fn test_personal_message_framing() {
        assert_eq!(
            personal_message(b"hello"),
            b"\x19Ethereum Signed Message:\n5hello".to_vec()
        );
        assert_eq!(
            personal_message(b""),
            b"\x19Ethereum Signed Message:\n0".to_vec()
        );
    }

    #[test]
    fn test_canonical_text_field_order() {
        let cid = identify(b"doc");
        let (attestation, _) = AttestationBuilder::new(cid)
            .timestamp(1_700_000_000_000)
            .organization("Acme")
            .sign(&signer())
            .unwrap();

        assert_eq!(
            attestation.canonical_text(),
            format!(
                "{} 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266 1700000000000 Acme",
                cid
            )
        );
    }

    #[test]
    fn test_default_organization() {
        let (attestation, _) = AttestationBuilder::new(identify(b"doc"))
            .timestamp(1)
            .sign(&signer())
            .unwrap();
        assert_eq!(attestation.organization, "-");

        let (attestation, _) = AttestationBuilder::new(identify(b"doc"))
            .organization("")
            .sign(&signer())
            .unwrap();
        assert!(attestation.canonical_text().ends_with(" -"));
    }

    #[test]
    fn test_envelope_unframes_to_attestation_text() {
        let (attestation, envelope) = AttestationBuilder::new(identify(b"doc"))
            .timestamp(1_700_000_000_000)
            .organization("Acme Rechtsanwälte GmbH")
            .sign(&signer())
            .unwrap();

        assert!(envelope.canonical_message().starts_with(PERSONAL_MESSAGE_PREFIX));
        assert_eq!(
            envelope.attestation_text().unwrap(),
            attestation.canonical_text()
        );
    }

    #[test]
    fn test_attestation_parse_roundtrip() {
        let (attestation, _) = AttestationBuilder::new(identify(b"doc"))
            .timestamp(42)
            .organization("Acme Legal Dept")
            .sign(&signer())
            .unwrap();
        let parsed = Attestation::parse(&attestation.canonical_text()).unwrap();
        assert_eq!(parsed, attestation);
    }

    #[test]
    fn test_multiline_organization_rejected() {
        let result = AttestationBuilder::new(identify(b"doc"))
            .organization("Acme\nEvil")
            .sign(&signer());
        assert!(matches!(result, Err(CoreError::InvalidAttestation(_))));
    }

    #[test]
    fn test_unicode_line_separators_rejected() {
        for organization in ["Acme\u{2028}Evil", "Acme\u{2029}Evil"] {
            let result = AttestationBuilder::new(identify(b"doc"))
                .organization(organization)
                .sign(&signer());
            assert!(matches!(result, Err(CoreError::InvalidAttestation(_))));
        }
        // non-breaking spaces stay on one line
        assert!(!breaks_line('\u{00A0}'));
    }

    #[test]
    fn test_signer_failure_propagates() {
        let result = AttestationBuilder::new(identify(b"doc")).sign(&RejectingSigner);
        assert!(matches!(result, Err(CoreError::Signing(_))));
    }

    #[test]
    fn test_unframe_rejects_bad_framing() {
        let bad_prefix = SignedEnvelope::new(RecoverableSignature([0; 65]), b"hello".to_vec());
        assert!(matches!(
            bad_prefix.attestation_text(),
            Err(CoreError::MalformedEnvelope(_))
        ));

        let mut wrong_len = PERSONAL_MESSAGE_PREFIX.to_vec();
        wrong_len.extend_from_slice(b"9hello");
        let envelope = SignedEnvelope::new(RecoverableSignature([0; 65]), wrong_len);
        assert!(envelope.attestation_text().is_err());
    }

    #[test]
    fn test_unframe_body_starting_with_digits() {
        // "12" + "345678901234" -> body of 12 bytes that itself starts with digits
        let framed = personal_message(b"345678901234");
        assert_eq!(unframe(&framed).unwrap(), b"345678901234");
    }
}
