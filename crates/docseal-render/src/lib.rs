//! # docseal render
//!
//! Turns a signed attestation into a visible stamp on a PDF page.
//!
//! The stamp is rendered as a standalone one-page overlay PDF (signature
//! graphic, scannable code, perimeter trail) and then merged onto exactly one
//! page of the target document. Every other page is left untouched.
//!
//! ## Key Types
//!
//! - [`StampCompositor`] - Lays out, renders and merges overlays
//! - [`CodeMatrixEncoder`] - Payload to code image; [`QrEncoder`] by default
//! - [`PdfDocument`] - Page lookup (with clamping) and overlay merge
//! - [`CompositorConfig`] - Sizes, offsets and opacities

pub mod canvas;
pub mod code;
pub mod compose;
pub mod config;
pub mod error;
pub mod graphic;
pub mod merge;

pub use canvas::{OverlayCanvas, PageBox, Rect, COURIER_ADVANCE};
pub use code::{with_rounded_corners, CodeMatrixEncoder, QrEncoder};
pub use compose::{PlacedImage, Placement, StampCompositor, StampOverlay};
pub use config::{CompositorConfig, ErrorCorrection};
pub use error::{RenderError, Result};
pub use graphic::SignatureGraphic;
pub use merge::{PdfDocument, StampTarget};
