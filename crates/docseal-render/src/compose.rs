//! Stamp overlay construction.
//!
//! An overlay holds three elements, drawn in this order:
//!
//! 1. the scannable code, offset from the signature position
//! 2. the perimeter trail around the code, at low opacity
//! 3. the signature graphic at full opacity

use image::RgbaImage;
use tracing::{debug, info};

use docseal_core::{
    build_rounded_rect_path, layout_with_filler, PerimeterTextLayout, Point, VerificationPayload,
};

use crate::canvas::{OverlayCanvas, PageBox, Rect, COURIER_ADVANCE};
use crate::code::{with_rounded_corners, CodeMatrixEncoder, QrEncoder};
use crate::config::CompositorConfig;
use crate::error::{RenderError, Result};
use crate::graphic::SignatureGraphic;
use crate::merge::{PdfDocument, StampTarget};

/// Where the signature goes, in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Lower-left corner of the signature graphic.
    pub position: Point,
    /// Points per graphic pixel.
    pub scale: f64,
}

impl Placement {
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self {
            position: Point::new(x, y),
            scale,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.position.is_finite() {
            return Err(RenderError::InvalidPlacement(format!(
                "position must be finite, got {:?}",
                self.position
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(RenderError::InvalidPlacement(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// An image and the rectangle it is drawn into.
#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub image: RgbaImage,
    pub rect: Rect,
}

/// Everything drawn on the overlay page.
#[derive(Debug, Clone)]
pub struct StampOverlay {
    page: PageBox,
    signature: PlacedImage,
    code: PlacedImage,
    trail: PerimeterTextLayout,
    trail_font_size: f64,
    trail_opacity: f64,
}

impl StampOverlay {
    /// The target page box.
    pub fn page(&self) -> PageBox {
        self.page
    }

    /// The signature graphic and where it lands.
    pub fn signature(&self) -> &PlacedImage {
        &self.signature
    }

    /// The scannable code and where it lands.
    pub fn code(&self) -> &PlacedImage {
        &self.code
    }

    /// The attestation text laid around the code.
    pub fn trail(&self) -> &PerimeterTextLayout {
        &self.trail
    }

    /// Render to a standalone one-page PDF.
    pub fn render(&self) -> Result<Vec<u8>> {
        let mut canvas = OverlayCanvas::new(self.page);
        canvas.draw_image(&self.code.image, self.code.rect, 1.0)?;
        canvas.draw_glyphs(
            self.trail.placements(),
            self.trail_font_size,
            self.trail_opacity,
        )?;
        canvas.draw_image(&self.signature.image, self.signature.rect, 1.0)?;
        canvas.finish()
    }
}

/// Builds stamp overlays and merges them into documents.
pub struct StampCompositor<E = QrEncoder> {
    config: CompositorConfig,
    encoder: E,
}

impl StampCompositor<QrEncoder> {
    /// A compositor using a QR encoder at the configured error-correction
    /// level.
    pub fn new(config: CompositorConfig) -> Result<Self> {
        let encoder = QrEncoder::new(config.error_correction);
        Self::with_encoder(config, encoder)
    }
}

impl<E: CodeMatrixEncoder> StampCompositor<E> {
    /// A compositor with a custom code encoder. Fails on an invalid config.
    pub fn with_encoder(config: CompositorConfig, encoder: E) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, encoder })
    }

    /// The settings in use.
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Lay out the overlay for a page.
    ///
    /// `trail_text` is repeated around the code; callers pass the attestation
    /// text.
    pub fn build_overlay(
        &self,
        page: PageBox,
        graphic: &SignatureGraphic,
        placement: Placement,
        payload: &VerificationPayload,
        trail_text: &str,
    ) -> Result<StampOverlay> {
        placement.validate()?;
        let config = &self.config;

        let (sig_width, sig_height) = graphic.scaled_size(placement.scale);
        let signature = PlacedImage {
            image: graphic.image().clone(),
            rect: Rect::new(
                placement.position.x,
                placement.position.y,
                sig_width,
                sig_height,
            ),
        };

        let matrix = self.encoder.encode(payload.as_str())?;
        let radius_px = config.round_code_corners.then(|| {
            config.code_corner_radius * f64::from(matrix.width()) / config.code_size
        });
        let code = PlacedImage {
            image: with_rounded_corners(&matrix, radius_px),
            rect: Rect::new(
                placement.position.x + config.code_offset_x,
                placement.position.y + sig_height / 4.0,
                config.code_size,
                config.code_size,
            ),
        };

        let margin = config.trail_margin;
        let path = build_rounded_rect_path(
            code.rect.x - margin,
            code.rect.y - margin,
            code.rect.width + 2.0 * margin,
            code.rect.height + 2.0 * margin,
            config.trail_corner_radius,
        )?;
        let advance = COURIER_ADVANCE * config.trail_font_size;
        let trail = layout_with_filler(trail_text, config.filler, advance, &path)?;

        debug!(
            code_x = code.rect.x,
            code_y = code.rect.y,
            code_pixels = matrix.width(),
            trail_glyphs = trail.placements().len(),
            "overlay laid out"
        );

        Ok(StampOverlay {
            page,
            signature,
            code,
            trail,
            trail_font_size: config.trail_font_size,
            trail_opacity: config.trail_opacity,
        })
    }

    /// Lay out and render the overlay.
    pub fn compose(
        &self,
        page: PageBox,
        graphic: &SignatureGraphic,
        placement: Placement,
        payload: &VerificationPayload,
        trail_text: &str,
    ) -> Result<Vec<u8>> {
        self.build_overlay(page, graphic, placement, payload, trail_text)?
            .render()
    }

    /// Compose an overlay for `page_number` and merge it into `document`.
    /// Returns the page actually stamped.
    pub fn stamp(
        &self,
        document: &mut PdfDocument,
        page_number: u32,
        graphic: &SignatureGraphic,
        placement: Placement,
        payload: &VerificationPayload,
        trail_text: &str,
    ) -> Result<StampTarget> {
        let target = document.resolve_page(page_number)?;
        let overlay = self.compose(target.media_box, graphic, placement, payload, trail_text)?;
        document.merge(&target, &overlay)?;
        info!(page = target.number, "stamp merged");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba};
    use lopdf::content::Content;
    use lopdf::{Document, Object};

    fn payload() -> VerificationPayload {
        let signature = docseal_core::RecoverableSignature([7u8; 65]);
        VerificationPayload::encode(&signature, &docseal_core::personal_message(b"hello"))
    }

    fn graphic() -> SignatureGraphic {
        SignatureGraphic::from_image(RgbaImage::from_pixel(80, 40, Rgba([0, 0, 255, 255])))
            .unwrap()
    }

    fn compositor() -> StampCompositor {
        StampCompositor::new(CompositorConfig::default()).unwrap()
    }

    struct FullEncoder;

    impl CodeMatrixEncoder for FullEncoder {
        fn encode(&self, _payload: &str) -> Result<GrayImage> {
            Err(RenderError::CodeCapacity("full".into()))
        }
    }

    struct BlankEncoder;

    impl CodeMatrixEncoder for BlankEncoder {
        fn encode(&self, payload: &str) -> Result<GrayImage> {
            assert!(payload.contains(" | "));
            Ok(GrayImage::from_pixel(10, 10, Luma([255])))
        }
    }

    #[test]
    fn test_code_offset_from_signature() {
        let overlay = compositor()
            .build_overlay(
                PageBox::sized(612.0, 792.0),
                &graphic(),
                Placement::new(50.0, 50.0, 0.5),
                &payload(),
                "trail",
            )
            .unwrap();

        assert_eq!(overlay.signature().rect, Rect::new(50.0, 50.0, 40.0, 20.0));
        // (x + 16, y + scaled height / 4)
        assert_eq!(overlay.code().rect, Rect::new(66.0, 55.0, 48.0, 48.0));
    }

    #[test]
    fn test_trail_rings_the_code() {
        let overlay = compositor()
            .build_overlay(
                PageBox::sized(612.0, 792.0),
                &graphic(),
                Placement::new(100.0, 100.0, 1.0),
                &payload(),
                "bafy 0xabc 1700000000000 Acme",
            )
            .unwrap();

        let code = overlay.code().rect;
        let ring = Rect::new(code.x - 4.0, code.y - 4.0, 56.0, 56.0);
        let placements = overlay.trail().placements();
        assert!(!placements.is_empty());
        assert!(placements.iter().all(|g| ring.contains(g.position, 1e-9)));
        assert!(placements.iter().all(|g| !code.contains(g.position, -1e-9)));
        assert_eq!(overlay.trail().source_text(), "bafy 0xabc 1700000000000 Acme");
    }

    #[test]
    fn test_code_corners_are_masked() {
        let overlay = compositor()
            .build_overlay(
                PageBox::sized(612.0, 792.0),
                &graphic(),
                Placement::new(0.0, 0.0, 1.0),
                &payload(),
                "t",
            )
            .unwrap();
        let code = &overlay.code().image;
        assert_eq!(code.get_pixel(0, 0)[3], 0);
        let mid = code.width() / 2;
        assert_eq!(code.get_pixel(mid, 0)[3], 255);
    }

    #[test]
    fn test_signature_is_drawn_last() {
        let bytes = compositor()
            .compose(
                PageBox::sized(300.0, 300.0),
                &graphic(),
                Placement::new(20.0, 20.0, 1.0),
                &payload(),
                "t",
            )
            .unwrap();

        let document = Document::load_mem(&bytes).unwrap();
        let page_id = document.get_pages()[&1];
        let content = Content::decode(&document.get_page_content(page_id).unwrap()).unwrap();
        let drawn: Vec<Vec<u8>> = content
            .operations
            .iter()
            .filter(|op| op.operator == "Do")
            .map(|op| match &op.operands[0] {
                Object::Name(name) => name.clone(),
                other => panic!("unexpected operand {other:?}"),
            })
            .collect();
        assert_eq!(drawn, vec![b"Im0".to_vec(), b"Im1".to_vec()]);

        let first_text = content
            .operations
            .iter()
            .position(|op| op.operator == "BT")
            .unwrap();
        let last_image = content
            .operations
            .iter()
            .rposition(|op| op.operator == "Do")
            .unwrap();
        assert!(first_text < last_image);
    }

    #[test]
    fn test_capacity_failure_propagates() {
        let compositor =
            StampCompositor::with_encoder(CompositorConfig::default(), FullEncoder).unwrap();
        let result = compositor.build_overlay(
            PageBox::sized(100.0, 100.0),
            &graphic(),
            Placement::new(0.0, 0.0, 1.0),
            &payload(),
            "t",
        );
        assert!(matches!(result, Err(RenderError::CodeCapacity(_))));
    }

    #[test]
    fn test_custom_encoder_and_flat_corners() {
        let config = CompositorConfig {
            round_code_corners: false,
            ..Default::default()
        };
        let compositor = StampCompositor::with_encoder(config, BlankEncoder).unwrap();
        let overlay = compositor
            .build_overlay(
                PageBox::sized(100.0, 100.0),
                &graphic(),
                Placement::new(0.0, 0.0, 1.0),
                &payload(),
                "t",
            )
            .unwrap();
        assert!(overlay.code().image.pixels().all(|p| p[3] == 255));
        assert_eq!(overlay.code().image.dimensions(), (10, 10));
    }

    #[test]
    fn test_rejects_bad_placement() {
        for placement in [
            Placement::new(f64::NAN, 0.0, 1.0),
            Placement::new(0.0, 0.0, 0.0),
            Placement::new(0.0, 0.0, -2.0),
        ] {
            let result = compositor().build_overlay(
                PageBox::sized(100.0, 100.0),
                &graphic(),
                placement,
                &payload(),
                "t",
            );
            assert!(matches!(result, Err(RenderError::InvalidPlacement(_))));
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = CompositorConfig {
            trail_opacity: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            StampCompositor::new(config),
            Err(RenderError::InvalidConfig(_))
        ));
    }
}
