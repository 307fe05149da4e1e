//! Merging a rendered overlay onto one page of a document.
//!
//! The overlay page becomes a Form XObject in the target document. The target
//! page gets an inline copy of its effective resources with the form added,
//! and its content array is wrapped as `q <original...> Q q /Form Do Q`.
//! Original content streams are referenced, never rewritten, and no object
//! reachable from another page is modified.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

use crate::canvas::PageBox;
use crate::error::{RenderError, Result};

/// Bound on the page tree depth walked for inherited attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

const STAMP_RESOURCE_PREFIX: &str = "DsStamp";

/// The page an overlay will be merged onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampTarget {
    /// 1-based page number after clamping.
    pub number: u32,
    pub page_id: ObjectId,
    pub media_box: PageBox,
}

/// A loaded PDF document.
pub struct PdfDocument {
    document: Document,
}

impl PdfDocument {
    /// Parse a document from bytes.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(bytes)?;
        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// The underlying lopdf document.
    pub fn inner(&self) -> &Document {
        &self.document
    }

    /// Pick the page to stamp. Page numbers are 1-based; anything outside
    /// `1..=page_count` targets the nearest valid page.
    pub fn resolve_page(&self, requested: u32) -> Result<StampTarget> {
        let pages = self.document.get_pages();
        let last = pages
            .keys()
            .next_back()
            .copied()
            .ok_or(RenderError::EmptyDocument)?;

        let number = requested.clamp(1, last);
        if number != requested {
            warn!(requested, page = number, "page number out of range, clamped");
        }
        let page_id = pages
            .get(&number)
            .copied()
            .ok_or(RenderError::EmptyDocument)?;

        let media_box = self
            .inherited(page_id, b"MediaBox")?
            .ok_or(RenderError::MissingPageAttribute("MediaBox"))?;
        let media_box = PageBox::from_object(&media_box)?;

        Ok(StampTarget {
            number,
            page_id,
            media_box,
        })
    }

    /// Draw a one-page overlay document on top of `target`.
    pub fn merge(&mut self, target: &StampTarget, overlay: &[u8]) -> Result<()> {
        let form_id = self.import_overlay(overlay)?;

        let mut resources = self.effective_resources(target.page_id)?;
        let mut xobjects = match resources.get(b"XObject") {
            Ok(object) => self.resolve(object)?.as_dict()?.clone(),
            Err(_) => Dictionary::new(),
        };
        let name = unique_name(&xobjects);
        xobjects.set(name.clone(), form_id);
        resources.set("XObject", xobjects);

        let mut contents = vec![Object::Reference(self.content_stream(vec![Operation::new(
            "q",
            vec![],
        )])?)];
        contents.extend(self.content_refs(target.page_id)?);
        contents.push(Object::Reference(self.content_stream(vec![
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
            Operation::new("Q", vec![]),
        ])?));

        let page = self.document.get_dictionary_mut(target.page_id)?;
        page.set("Resources", resources);
        page.set("Contents", contents);

        debug!(page = target.number, form = %name, "overlay merged");
        Ok(())
    }

    /// Serialize the document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.document
            .save_to(&mut bytes)
            .map_err(lopdf::Error::from)?;
        Ok(bytes)
    }

    /// Move the overlay's objects into this document and wrap its page as a
    /// Form XObject. Returns the form's id.
    fn import_overlay(&mut self, overlay: &[u8]) -> Result<ObjectId> {
        let mut overlay = Document::load_mem(overlay)?;
        overlay.renumber_objects_with(self.document.max_id + 1);

        let page_id = overlay
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or(RenderError::EmptyDocument)?;
        let content = overlay.get_page_content(page_id)?;

        let page = overlay.get_dictionary(page_id)?;
        let resources = match page.get(b"Resources") {
            Ok(Object::Reference(id)) => overlay.get_dictionary(*id)?.clone(),
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        let bbox = PageBox::from_object(
            page.get(b"MediaBox")
                .map_err(|_| RenderError::MissingPageAttribute("MediaBox"))?,
        )?;

        // The page tree skeleton is dropped; what it referenced is kept.
        let mut skeleton = overlay.get_page_contents(page_id);
        skeleton.push(page_id);
        if let Ok(parent) = page.get(b"Parent").and_then(Object::as_reference) {
            skeleton.push(parent);
        }
        if let Ok(root) = overlay.trailer.get(b"Root").and_then(Object::as_reference) {
            skeleton.push(root);
        }
        for id in skeleton {
            overlay.objects.remove(&id);
        }

        self.document.max_id = self.document.max_id.max(overlay.max_id);
        self.document.objects.extend(overlay.objects);

        Ok(self.document.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "FormType" => 1,
                "BBox" => bbox.to_object(),
                "Resources" => resources,
            },
            content,
        )))
    }

    /// A standalone copy of the page's resources, including any inherited
    /// from ancestors.
    fn effective_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        match self.inherited(page_id, b"Resources")? {
            Some(Object::Dictionary(dict)) => Ok(dict),
            Some(_) => Err(RenderError::MissingPageAttribute("Resources")),
            None => Ok(Dictionary::new()),
        }
    }

    /// Look up `key` on the page or the nearest ancestor that defines it,
    /// following one level of indirection.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        let mut node = self.document.get_dictionary(page_id)?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Ok(Some(self.resolve(value)?.clone()));
            }
            match node.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => node = self.document.get_dictionary(parent)?,
                Err(_) => return Ok(None),
            }
        }
        Ok(None)
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object> {
        match object {
            Object::Reference(id) => Ok(self.document.get_object(*id)?),
            other => Ok(other),
        }
    }

    /// The page's content stream references in drawing order.
    fn content_refs(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let page = self.document.get_dictionary(page_id)?;
        match page.get(b"Contents") {
            Err(_) => Ok(Vec::new()),
            Ok(Object::Array(items)) => Ok(items.clone()),
            Ok(Object::Reference(id)) => match self.document.get_object(*id)? {
                Object::Array(items) => Ok(items.clone()),
                _ => Ok(vec![Object::Reference(*id)]),
            },
            Ok(_) => Err(RenderError::MissingPageAttribute("Contents")),
        }
    }

    fn content_stream(&mut self, operations: Vec<Operation>) -> Result<ObjectId> {
        let content = Content { operations }.encode()?;
        Ok(self
            .document
            .add_object(Stream::new(Dictionary::new(), content)))
    }
}

fn unique_name(xobjects: &Dictionary) -> String {
    let mut index = 0usize;
    loop {
        let name = format!("{STAMP_RESOURCE_PREFIX}{index}");
        if !xobjects.has(name.as_bytes()) {
            return name;
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{OverlayCanvas, Rect};
    use docseal_testkit::fixtures::{empty_pdf, sample_pdf, snapshot_pages};
    use image::{Rgba, RgbaImage};

    fn overlay_for(target: &StampTarget) -> Vec<u8> {
        let mut canvas = OverlayCanvas::new(target.media_box);
        let image = RgbaImage::from_pixel(2, 2, Rgba([200, 0, 0, 255]));
        canvas
            .draw_image(&image, Rect::new(50.0, 50.0, 10.0, 10.0), 1.0)
            .unwrap();
        canvas.finish().unwrap()
    }

    fn stamp(source: &[u8], page: u32) -> (StampTarget, Vec<u8>) {
        let mut document = PdfDocument::load(source).unwrap();
        let target = document.resolve_page(page).unwrap();
        document.merge(&target, &overlay_for(&target)).unwrap();
        (target, document.to_bytes().unwrap())
    }

    #[test]
    fn test_page_isolation() {
        let source = sample_pdf(5);
        let (target, stamped) = stamp(&source, 2);
        assert_eq!(target.number, 2);

        let before = snapshot_pages(&source);
        let after = snapshot_pages(&stamped);
        assert_eq!(after.len(), 5);
        for (index, (b, a)) in before.iter().zip(&after).enumerate() {
            if index == 1 {
                assert_ne!(b, a, "stamped page must change");
            } else {
                assert_eq!(b, a, "page {} must be untouched", index + 1);
            }
        }
    }

    #[test]
    fn test_stamped_page_draws_form_last() {
        let (target, stamped) = stamp(&sample_pdf(1), 1);
        let document = Document::load_mem(&stamped).unwrap();
        let page = document.get_dictionary(target.page_id).unwrap();

        let operators = |item: &Object| -> Vec<String> {
            let id = item.as_reference().unwrap();
            let stream = document.get_object(id).unwrap().as_stream().unwrap();
            Content::decode(&stream.content)
                .unwrap()
                .operations
                .into_iter()
                .map(|op| op.operator)
                .collect()
        };
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(operators(&contents[0]), vec!["q"]);
        assert_eq!(operators(&contents[2]), vec!["Q", "q", "Do", "Q"]);

        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let form_id = xobjects.get(b"DsStamp0").unwrap().as_reference().unwrap();
        let form = document.get_object(form_id).unwrap().as_stream().unwrap();
        assert_eq!(
            form.dict.get(b"Subtype").unwrap().as_name().unwrap(),
            b"Form"
        );
        // the fixture's font is still reachable from the stamped page
        assert!(resources.has(b"Font"));
    }

    #[test]
    fn test_stamping_twice_uses_fresh_names() {
        let (_, once) = stamp(&sample_pdf(1), 1);
        let (target, twice) = stamp(&once, 1);

        let document = Document::load_mem(&twice).unwrap();
        let page = document.get_dictionary(target.page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert!(xobjects.has(b"DsStamp0"));
        assert!(xobjects.has(b"DsStamp1"));
    }

    #[test]
    fn test_page_clamp() {
        let document = PdfDocument::load(&sample_pdf(3)).unwrap();
        assert_eq!(document.resolve_page(99).unwrap().number, 3);
        assert_eq!(document.resolve_page(0).unwrap().number, 1);
        assert_eq!(document.resolve_page(2).unwrap().number, 2);
    }

    #[test]
    fn test_inherited_media_box() {
        let document = PdfDocument::load(&sample_pdf(2)).unwrap();
        let target = document.resolve_page(1).unwrap();
        assert_eq!(target.media_box, PageBox::sized(612.0, 792.0));
    }

    #[test]
    fn test_zero_pages() {
        let document = PdfDocument::load(&empty_pdf()).unwrap();
        assert_eq!(document.page_count(), 0);
        assert!(matches!(
            document.resolve_page(1),
            Err(RenderError::EmptyDocument)
        ));
    }

    #[test]
    fn test_unique_name_skips_taken() {
        let mut xobjects = Dictionary::new();
        assert_eq!(unique_name(&xobjects), "DsStamp0");
        xobjects.set("DsStamp0", Object::Null);
        assert_eq!(unique_name(&xobjects), "DsStamp1");
    }
}
