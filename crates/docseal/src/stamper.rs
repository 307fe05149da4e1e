//! The stamping pipeline.
//!
//! ```text
//! document bytes -> identify -> attest + sign -> payload -> code
//!                                     \-> perimeter trail
//! code + trail + signature graphic -> overlay -> merge -> identify again
//! ```
//!
//! Inputs are loaded and checked before anything is signed, and nothing is
//! written here: the caller gets the sealed bytes or an error.

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use docseal_core::{
    identify, Attestation, AttestationBuilder, ContentAddresser, ContentIdentifier,
    SignedEnvelope, Signer, VerificationPayload,
};
use docseal_render::{
    CodeMatrixEncoder, CompositorConfig, PdfDocument, Placement, QrEncoder, RenderError,
    SignatureGraphic, StampCompositor,
};

use crate::error::{Result, StampError};

const READ_CHUNK: usize = 64 * 1024;

/// One stamping job.
#[derive(Debug, Clone)]
pub struct StampRequest<'a> {
    /// The original document.
    pub document: &'a [u8],
    /// Encoded signature graphic (PNG or JPEG).
    pub signature_graphic: &'a [u8],
    /// Target page, 1-based. Out-of-range values clamp.
    pub page: u32,
    /// Signature position and scale.
    pub placement: Placement,
    /// Attestation time in Unix milliseconds.
    pub timestamp_millis: u64,
    /// Organization; `None` or empty means `-`.
    pub organization: Option<String>,
}

/// The result of a successful stamp.
#[derive(Debug, Clone)]
pub struct SealedDocument {
    /// The stamped document.
    pub bytes: Bytes,
    pub attestation: Attestation,
    pub envelope: SignedEnvelope,
    pub payload: VerificationPayload,
    /// Identifier of the input bytes.
    pub original_cid: ContentIdentifier,
    /// Identifier of [`Self::bytes`].
    pub sealed_cid: ContentIdentifier,
    /// Page that received the stamp.
    pub page: u32,
}

impl SealedDocument {
    /// The printable summary.
    pub fn summary(&self) -> StampSummary {
        StampSummary {
            signer: self.attestation.signer.to_checksum(),
            original_cid: self.original_cid.to_string(),
            sealed_cid: self.sealed_cid.to_string(),
            signature: self.envelope.signature().to_prefixed_hex(),
            message_base64: STANDARD.encode(self.envelope.canonical_message()),
            page: self.page,
        }
    }
}

/// What a stamping run reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StampSummary {
    /// Checksummed signer address.
    pub signer: String,
    pub original_cid: String,
    pub sealed_cid: String,
    /// `0x`-prefixed hex of the 65-byte signature.
    pub signature: String,
    /// Base64 of the canonical message.
    pub message_base64: String,
    pub page: u32,
}

/// Signs documents and stamps them.
pub struct Stamper<S, E = QrEncoder> {
    signer: S,
    compositor: StampCompositor<E>,
}

impl<S: Signer> Stamper<S> {
    /// A stamper with the default QR encoder.
    pub fn new(signer: S, config: CompositorConfig) -> Result<Self> {
        let compositor = StampCompositor::new(config)?;
        Ok(Self::with_compositor(signer, compositor))
    }
}

impl<S: Signer, E: CodeMatrixEncoder> Stamper<S, E> {
    /// A stamper around an already built compositor.
    pub fn with_compositor(signer: S, compositor: StampCompositor<E>) -> Self {
        Self { signer, compositor }
    }

    /// The key that signs attestations.
    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Run the whole pipeline.
    pub fn stamp(&self, request: &StampRequest<'_>) -> Result<SealedDocument> {
        let original_cid = identify(request.document);
        debug!(cid = %original_cid, len = request.document.len(), "document identified");

        let mut document = PdfDocument::load(request.document)?;
        if document.page_count() == 0 {
            return Err(StampError::from(RenderError::EmptyDocument));
        }
        let graphic = SignatureGraphic::from_bytes(request.signature_graphic)?;

        let mut builder = AttestationBuilder::new(original_cid).timestamp(request.timestamp_millis);
        if let Some(organization) = &request.organization {
            builder = builder.organization(organization.as_str());
        }
        let (attestation, envelope) = builder.sign(&self.signer)?;
        let payload = VerificationPayload::from_envelope(&envelope);

        let target = self.compositor.stamp(
            &mut document,
            request.page,
            &graphic,
            request.placement,
            &payload,
            &attestation.canonical_text(),
        )?;
        let bytes = Bytes::from(document.to_bytes()?);
        let sealed_cid = identify(&bytes);

        info!(
            signer = %attestation.signer,
            original = %original_cid,
            sealed = %sealed_cid,
            page = target.number,
            "document sealed"
        );

        Ok(SealedDocument {
            bytes,
            attestation,
            envelope,
            payload,
            original_cid,
            sealed_cid,
            page: target.number,
        })
    }
}

/// Identify a stream of bytes without holding it in memory.
pub fn identify_reader<R: Read>(mut reader: R) -> Result<ContentIdentifier> {
    let mut addresser = ContentAddresser::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(StampError::Hashing(e)),
        };
        addresser.update(&buf[..read]);
    }
    Ok(addresser.finalize())
}
