//! # docseal
//!
//! Verifiable stamps for PDF documents.
//!
//! A stamp binds the content identifier of a document to a signer, a time and
//! an organization. The binding is signed as a personal message, embedded in a
//! scannable code, and drawn onto one page next to a signature graphic, ringed
//! by a faint trail of the attestation text.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docseal::{Placement, StampRequest, Stamper};
//! use docseal::core::LocalSigner;
//! use docseal::render::CompositorConfig;
//!
//! # fn main() -> docseal::Result<()> {
//! let signer = LocalSigner::from_hex("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")?;
//! let stamper = Stamper::new(signer, CompositorConfig::default())?;
//!
//! let document = std::fs::read("contract.pdf")?;
//! let graphic = std::fs::read("signature.png")?;
//! let sealed = stamper.stamp(&StampRequest {
//!     document: &document,
//!     signature_graphic: &graphic,
//!     page: 1,
//!     placement: Placement::new(50.0, 50.0, 0.5),
//!     timestamp_millis: 1_700_000_000_000,
//!     organization: Some("Acme".into()),
//! })?;
//!
//! println!("{}", sealed.summary().sealed_cid);
//! # Ok(())
//! # }
//! ```
//!
//! ## Re-exports
//!
//! - `docseal::core` - Identifiers, attestations, payloads, perimeter geometry
//! - `docseal::render` - Code generation, overlay rendering, PDF merge

pub mod config;
pub mod error;
pub mod keys;
pub mod output;
pub mod stamper;

// Re-export component crates
pub use docseal_core as core;
pub use docseal_render as render;

pub use config::StampConfig;
pub use error::{Result, StampError};
pub use keys::signer_from_arg;
pub use output::persist_atomically;
pub use stamper::{identify_reader, SealedDocument, StampRequest, StampSummary, Stamper};

// Re-export commonly used types
pub use docseal_core::{identify, Address, ContentIdentifier, LocalSigner, Signer};
pub use docseal_render::{CompositorConfig, Placement};
