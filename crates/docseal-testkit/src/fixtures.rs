//! Test fixtures and helpers.
//!
//! Small deterministic documents, graphics and keys for integration tests.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use docseal_core::LocalSigner;

/// Well-known development key (account #0 of the common test mnemonic).
/// Never use it for anything real.
pub const DEV_KEY_HEX: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Checksummed address of [`DEV_KEY_HEX`].
pub const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Page size used by [`sample_pdf`] (US Letter).
pub const SAMPLE_PAGE_SIZE: (f64, f64) = (612.0, 792.0);

/// Signer for [`DEV_KEY_HEX`].
pub fn dev_signer() -> LocalSigner {
    LocalSigner::from_hex(DEV_KEY_HEX).expect("dev key is valid")
}

/// A document with `page_count` pages.
///
/// The pages share one indirect Resources object and inherit their MediaBox
/// from the page tree root, so stamping one page must copy rather than edit
/// anything shared. Each page has a single content stream with its number.
pub fn sample_pdf(page_count: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = (1..=page_count)
        .map(|number| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("Page {number}"))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                Dictionary::new(),
                content.encode().expect("fixture content encodes"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            Object::Reference(page_id)
        })
        .collect();

    finish(doc, pages_id, kids)
}

/// A structurally valid document with an empty page tree.
pub fn empty_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    finish(doc, pages_id, Vec::new())
}

fn finish(mut doc: Document, pages_id: ObjectId, kids: Vec<Object>) -> Vec<u8> {
    let (width, height) = SAMPLE_PAGE_SIZE;
    let count = kids.len() as i64;
    let media_box: Vec<Object> = [0.0, 0.0, width, height]
        .iter()
        .map(|&v| Object::Integer(v as i64))
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => media_box,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("in-memory write");
    bytes
}

/// A 120x40 signature-like stroke on a transparent background.
pub fn sample_signature_image() -> RgbaImage {
    RgbaImage::from_fn(120, 40, |x, y| {
        let wave = 20.0 + 12.0 * (f64::from(x) / 9.0).sin();
        if (f64::from(y) - wave).abs() < 2.0 {
            Rgba([10, 20, 120, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// [`sample_signature_image`] encoded as PNG.
pub fn sample_signature_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    sample_signature_image()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("png encodes");
    bytes
}

/// What a page looks like from the outside: its dictionary, its resolved
/// resources and its content bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub page_id: ObjectId,
    pub dictionary: String,
    pub resources: String,
    pub content: Vec<u8>,
}

/// Snapshot every page of a document, in page order.
pub fn snapshot_pages(bytes: &[u8]) -> Vec<PageSnapshot> {
    let doc = Document::load_mem(bytes).expect("document parses");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_dictionary(page_id).expect("page dictionary");
            let resources = match page.get(b"Resources") {
                Ok(Object::Reference(id)) => {
                    format!("{:?}", doc.get_object(*id).expect("resources"))
                }
                Ok(other) => format!("{other:?}"),
                Err(_) => String::new(),
            };
            PageSnapshot {
                page_id,
                dictionary: format!("{page:?}"),
                resources,
                content: doc.get_page_content(page_id).expect("page content"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_pdf_pages() {
        let bytes = sample_pdf(3);
        let pages = snapshot_pages(&bytes);
        assert_eq!(pages.len(), 3);
        assert_ne!(pages[0].content, pages[1].content);
        assert_eq!(pages[0].resources, pages[2].resources);
    }

    #[test]
    fn test_sample_pdf_is_deterministic() {
        assert_eq!(sample_pdf(2), sample_pdf(2));
    }

    #[test]
    fn test_empty_pdf_has_no_pages() {
        let doc = Document::load_mem(&empty_pdf()).unwrap();
        assert!(doc.get_pages().is_empty());
    }

    #[test]
    fn test_signature_png_decodes() {
        let decoded = image::load_from_memory(&sample_signature_png()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 40));
    }
}
