//! # docseal testkit
//!
//! Testing utilities for docseal.
//!
//! This crate provides:
//!
//! - **Fixtures**: deterministic PDFs, signature graphics and a development key
//! - **Recovery**: signer recovery as an external verifier would perform it
//! - **Golden vectors**: fixed stamping scenarios for reproducibility tests
//! - **Generators**: proptest strategies
//!
//! ```rust
//! use docseal_testkit::fixtures::{sample_pdf, snapshot_pages};
//!
//! let pdf = sample_pdf(2);
//! assert_eq!(snapshot_pages(&pdf).len(), 2);
//! ```

pub mod fixtures;
pub mod generators;
pub mod recover;
pub mod vectors;

pub use fixtures::{dev_signer, DEV_ADDRESS, DEV_KEY_HEX};
pub use recover::recover_signer;
