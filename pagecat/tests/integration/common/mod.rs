//! Fixtures built on the fly.
//!
//! Every PDF page draws a marker string `(name-i)` so tests can tell pages
//! apart after export.

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

/// Write a PDF named `name` with `pages` pages into `dir`.
pub fn write_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
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

    let kids: Vec<Object> = (0..pages)
        .map(|i| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(marker(name, i))]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap_or_default(),
            ));
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            }))
        })
        .collect();

    // Resources and MediaBox live on the tree root and must be inherited.
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Marker text drawn on page `index` of the fixture `name`.
pub fn marker(name: &str, index: usize) -> String {
    format!("{name}-{index}")
}

/// Write an opaque RGB PNG.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]))
        .save(&path)
        .unwrap();
    path
}

/// Write a fully transparent RGBA PNG.
pub fn write_transparent_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 0]))
        .save(&path)
        .unwrap();
    path
}

/// Write a file with a PDF extension and garbage content.
pub fn write_corrupt_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4\nthis is not a pdf").unwrap();
    path
}

/// Text drawn on each page of `doc`, in page order.
pub fn page_markers(doc: &Document) -> Vec<Option<String>> {
    doc.get_pages()
        .values()
        .map(|&id| page_marker(doc, id))
        .collect()
}

fn page_marker(doc: &Document, page_id: ObjectId) -> Option<String> {
    let content = doc.get_and_decode_page_content(page_id).ok()?;
    content.operations.iter().find_map(|op| {
        (op.operator == "Tj")
            .then(|| op.operands.first())
            .flatten()
            .and_then(|o| o.as_str().ok())
            .map(|s| String::from_utf8_lossy(s).into_owned())
    })
}

/// Whether page `page_id` draws an image XObject.
pub fn draws_image(doc: &Document, page_id: ObjectId) -> bool {
    doc.get_and_decode_page_content(page_id)
        .map(|c| c.operations.iter().any(|op| op.operator == "Do"))
        .unwrap_or(false)
}

/// MediaBox of `page_id` as `[x0, y0, x1, y1]`.
pub fn media_box(doc: &Document, page_id: ObjectId) -> Vec<f32> {
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_float().unwrap())
        .collect()
}
