//! # docseal core
//!
//! Pure primitives for stamping verifiable attestations onto documents.
//!
//! This crate contains no I/O, no PDF handling, no image decoding. It is pure
//! computation: hashing, message framing, payload encoding, and the geometry
//! of the decorative perimeter trail.
//!
//! ## Key Types
//!
//! - [`ContentIdentifier`] - CIDv1 (dag-pb, sha2-256) of a byte sequence
//! - [`Attestation`] - The fields bound together by a signature
//! - [`SignedEnvelope`] - The signature plus the exact bytes that were signed
//! - [`VerificationPayload`] - The string embedded in the scannable code
//! - [`PerimeterPath`] - A rounded rectangle as 8 contiguous segments
//! - [`PerimeterTextLayout`] - Characters placed along a perimeter path
//!
//! ## Signing
//!
//! Attestations are framed as personal messages (`"\x19Ethereum Signed Message:\n"`
//! + length + text) and signed with secp256k1 over the Keccak-256 digest of the
//! framed bytes. See [`attestation`] for the framing rules.

pub mod attestation;
pub mod cid;
pub mod crypto;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod payload;
pub mod perimeter;

pub use attestation::{
    breaks_line, personal_message, Attestation, AttestationBuilder, SignedEnvelope,
    DEFAULT_ORGANIZATION, PERSONAL_MESSAGE_PREFIX,
};
pub use cid::{identify, ContentAddresser, ContentIdentifier};
pub use crypto::{keccak256, Address, LocalSigner, RecoverableSignature, Signer};
pub use error::{CoreError, Result};
pub use geometry::Point;
pub use layout::{layout, layout_with_filler, GlyphPlacement, PerimeterTextLayout, FILLER};
pub use payload::{latin1_bytes, latin1_text, VerificationPayload, PAYLOAD_SEPARATOR};
pub use perimeter::{build_rounded_rect_path, PerimeterPath, PerimeterSegment};
