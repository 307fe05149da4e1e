//! A one-page PDF drawing surface.
//!
//! The overlay is written as a standalone document whose single page has the
//! target page's MediaBox, so that overlay coordinates are page coordinates.
//! Text uses the standard Courier font (no embedding), images are raw RGB
//! XObjects with an optional grayscale soft mask.

use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use docseal_core::{GlyphPlacement, Point};

use crate::error::{RenderError, Result};
use crate::graphic::PdfImage;

/// Advance width of every Courier glyph, per unit of font size.
pub const COURIER_ADVANCE: f64 = 0.6;

const FONT_RESOURCE: &str = "F1";

/// Axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// A rectangle with lower-left corner `(x, y)`.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Lower-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether `point` lies inside, allowing `slack` on every side.
    pub fn contains(&self, point: Point, slack: f64) -> bool {
        point.x >= self.x - slack
            && point.x <= self.x + self.width + slack
            && point.y >= self.y - slack
            && point.y <= self.y + self.height + slack
    }

    fn is_drawable(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// A page's MediaBox, normalized so that `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PageBox {
    /// A box spanning the two corners, in either order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// A box of the given size at the origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Horizontal extent in points.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Vertical extent in points.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub(crate) fn to_object(self) -> Object {
        Object::Array(
            [self.x0, self.y0, self.x1, self.y1]
                .into_iter()
                .map(real)
                .collect(),
        )
    }

    /// Parse a `[x0 y0 x1 y1]` array.
    pub(crate) fn from_object(object: &Object) -> Result<Self> {
        let values = object
            .as_array()
            .map_err(|_| RenderError::MissingPageAttribute("MediaBox"))?
            .iter()
            .map(number)
            .collect::<Option<Vec<f64>>>()
            .ok_or(RenderError::MissingPageAttribute("MediaBox"))?;

        match values[..] {
            [x0, y0, x1, y1] if values.iter().all(|v| v.is_finite()) => {
                Ok(Self::new(x0, y0, x1, y1))
            }
            _ => Err(RenderError::MissingPageAttribute("MediaBox")),
        }
    }
}

/// Drawing surface for the overlay page.
pub struct OverlayCanvas {
    page: PageBox,
    document: Document,
    operations: Vec<Operation>,
    xobjects: Dictionary,
    graphic_states: Dictionary,
    font: Option<ObjectId>,
}

impl OverlayCanvas {
    /// An empty canvas covering `page`.
    pub fn new(page: PageBox) -> Self {
        Self {
            page,
            document: Document::with_version("1.5"),
            operations: Vec::new(),
            xobjects: Dictionary::new(),
            graphic_states: Dictionary::new(),
            font: None,
        }
    }

    /// The page box the overlay is drawn on.
    pub fn page(&self) -> PageBox {
        self.page
    }

    /// Draw `image` stretched over `rect`.
    pub fn draw_image(&mut self, image: &RgbaImage, rect: Rect, opacity: f64) -> Result<()> {
        if !rect.is_drawable() {
            return Err(RenderError::InvalidGraphic(format!(
                "cannot draw into {rect:?}"
            )));
        }

        let name = format!("Im{}", self.xobjects.len());
        let image_id = self.add_image(image);
        self.xobjects.set(name.clone(), image_id);

        self.operations.push(Operation::new("q", vec![]));
        self.apply_opacity(opacity);
        self.operations.push(Operation::new(
            "cm",
            vec![
                real(rect.width),
                real(0.0),
                real(0.0),
                real(rect.height),
                real(rect.x),
                real(rect.y),
            ],
        ));
        self.operations
            .push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        self.operations.push(Operation::new("Q", vec![]));
        Ok(())
    }

    /// Draw each glyph at its position, rotated about its baseline origin.
    ///
    /// Characters outside latin-1 are drawn as `?`.
    pub fn draw_glyphs(
        &mut self,
        glyphs: &[GlyphPlacement],
        font_size: f64,
        opacity: f64,
    ) -> Result<()> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "font size must be positive, got {font_size}"
            )));
        }
        if glyphs.is_empty() {
            return Ok(());
        }
        self.ensure_font();

        self.operations.push(Operation::new("q", vec![]));
        self.apply_opacity(opacity);
        self.operations.push(Operation::new("BT", vec![]));
        self.operations.push(Operation::new(
            "Tf",
            vec![Object::Name(FONT_RESOURCE.into()), real(font_size)],
        ));
        for glyph in glyphs {
            let (sin, cos) = glyph.rotation_degrees.to_radians().sin_cos();
            self.operations.push(Operation::new(
                "Tm",
                vec![
                    real(cos),
                    real(sin),
                    real(-sin),
                    real(cos),
                    real(glyph.position.x),
                    real(glyph.position.y),
                ],
            ));
            self.operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(vec![glyph_byte(glyph.character)])],
            ));
        }
        self.operations.push(Operation::new("ET", vec![]));
        self.operations.push(Operation::new("Q", vec![]));
        Ok(())
    }

    /// Write the page tree and serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let content = Content {
            operations: self.operations,
        }
        .encode()?;
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), content));

        let mut resources = Dictionary::new();
        if !self.xobjects.is_empty() {
            resources.set("XObject", self.xobjects);
        }
        if !self.graphic_states.is_empty() {
            resources.set("ExtGState", self.graphic_states);
        }
        if let Some(font) = self.font {
            resources.set("Font", dictionary! { FONT_RESOURCE => font });
        }

        let pages_id = self.document.new_object_id();
        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => self.page.to_object(),
            "Resources" => resources,
            "Contents" => content_id,
        });
        self.document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.document
            .save_to(&mut bytes)
            .map_err(lopdf::Error::from)?;
        Ok(bytes)
    }

    fn add_image(&mut self, image: &RgbaImage) -> ObjectId {
        let PdfImage {
            width,
            height,
            rgb,
            alpha,
        } = PdfImage::from_rgba(image);

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        if let Some(alpha) = alpha {
            let mask_id = self.document.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(width),
                    "Height" => i64::from(height),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                alpha,
            ));
            dict.set("SMask", mask_id);
        }
        self.document.add_object(Stream::new(dict, rgb))
    }

    fn apply_opacity(&mut self, opacity: f64) {
        if opacity >= 1.0 {
            return;
        }
        let name = format!("Gs{}", self.graphic_states.len());
        self.graphic_states.set(
            name.clone(),
            dictionary! {
                "Type" => "ExtGState",
                "ca" => real(opacity),
                "CA" => real(opacity),
            },
        );
        self.operations
            .push(Operation::new("gs", vec![Object::Name(name.into_bytes())]));
    }

    fn ensure_font(&mut self) {
        if self.font.is_none() {
            self.font = Some(self.document.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Courier",
                "Encoding" => "WinAnsiEncoding",
            }));
        }
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as _)
}

fn number(object: &Object) -> Option<f64> {
    match *object {
        Object::Integer(i) => Some(i as f64),
        Object::Real(r) => Some(f64::from(r)),
        _ => None,
    }
}

fn glyph_byte(c: char) -> u8 {
    u8::try_from(u32::from(c)).unwrap_or(b'?')
}
