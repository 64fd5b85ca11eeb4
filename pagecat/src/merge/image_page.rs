//! Raster images as full PDF pages.
//!
//! An image becomes one page whose size is its pixel size at [`IMAGE_DPI`]
//! (so a 1000x500 image gives a 720x360 pt page), with the image drawn to fill
//! it. Pixels are embedded as an uncompressed 8-bit DeviceRGB XObject; the
//! writer applies stream compression afterwards.

use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::error::Result;

/// Resolution used to size image pages, in dots per inch.
pub const IMAGE_DPI: f32 = 100.0;

/// Name of the image XObject in the page resources.
const XOBJECT_NAME: &str = "Im0";

/// An image embedded in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// Object id of the image XObject.
    pub xobject: ObjectId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Decode an image file and flatten it to RGB.
///
/// Returns the decoder's message on failure.
pub fn decode_rgb(path: &Path) -> std::result::Result<RgbImage, String> {
    let image = image::ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| e.to_string())?
        .decode()
        .map_err(|e| e.to_string())?;
    Ok(flatten_to_rgb(image))
}

/// Convert any color mode to 8-bit RGB.
///
/// Transparent pixels are composited over white before the alpha channel is
/// dropped. Palette images arrive here already expanded by the decoder.
pub fn flatten_to_rgb(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }

    let rgba = image.into_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = u32::from(a);
        let over_white = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([over_white(r), over_white(g), over_white(b)])
    })
}

/// Add `image` to `doc` as an image XObject.
pub fn embed_image(doc: &mut Document, image: &RgbImage) -> EmbeddedImage {
    let (width, height) = image.dimensions();
    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        image.as_raw().clone(),
    );

    EmbeddedImage {
        xobject: doc.add_object(stream),
        width,
        height,
    }
}

/// Page size in points for `width` x `height` pixels at `dpi`.
pub fn page_size(width: u32, height: u32, dpi: f32) -> (f32, f32) {
    let scale = 72.0 / dpi;
    (width as f32 * scale, height as f32 * scale)
}

/// Add a page under `parent` that shows `image` edge to edge.
///
/// Returns the id of the new page object. The caller must add it to the
/// parent's Kids array.
pub fn add_image_page(
    doc: &mut Document,
    image: EmbeddedImage,
    dpi: f32,
    parent: ObjectId,
) -> Result<ObjectId> {
    let (w, h) = page_size(image.width, image.height, dpi);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec![Object::Name(XOBJECT_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
        "Resources" => dictionary! {
            "XObject" => dictionary! { XOBJECT_NAME => image.xobject },
        },
        "Contents" => content_id,
    });
    Ok(page_id)
}
