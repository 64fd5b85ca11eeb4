//! Source reading.
//!
//! [`SourceReader`] opens one source file: PDFs are parsed in full with
//! `lopdf`, images are only probed for their header so that adding a large
//! batch stays cheap. Pixel data is decoded later, at export or preview time.
//!
//! # Examples
//!
//! ```no_run
//! use pagecat::io::reader::SourceReader;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = SourceReader::new();
//! let handle = reader.open(Path::new("report.pdf"))?;
//! println!("{} page(s)", handle.page_count());
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Instant;

use lopdf::Document;
use tracing::{debug, instrument};

use crate::error::{PageCatError, Result};
use crate::page::SourceKind;
use crate::source::{ImageSource, PdfSource, SourceHandle};

/// Opens source files.
#[derive(Debug, Clone)]
pub struct SourceReader {
    /// Whether to reject PDFs without pages.
    verify: bool,
}

impl SourceReader {
    /// Create a reader with verification enabled.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that accepts PDFs without pages.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Open a source, dispatching on its extension.
    ///
    /// # Errors
    ///
    /// - [`PageCatError::UnsupportedSource`] for unknown extensions
    /// - [`PageCatError::SourceOpen`] if the file is unreadable, corrupt,
    ///   encrypted or (with verification) has no pages
    pub fn open(&self, path: &Path) -> Result<SourceHandle> {
        match SourceKind::from_path(path)? {
            SourceKind::Pdf => self.open_pdf(path).map(SourceHandle::Pdf),
            SourceKind::Image => self.probe_image(path).map(SourceHandle::Image),
        }
    }

    /// Parse a PDF document.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn open_pdf(&self, path: &Path) -> Result<PdfSource> {
        let start = Instant::now();

        let document = Document::load(path).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("encrypt") || msg.contains("password") {
                PageCatError::source_open(path, "encrypted documents are not supported")
            } else {
                PageCatError::source_open(path, msg)
            }
        })?;

        if document.is_encrypted() {
            return Err(PageCatError::source_open(
                path,
                "encrypted documents are not supported",
            ));
        }

        let page_count = document.get_pages().len();
        if self.verify && page_count == 0 {
            return Err(PageCatError::source_open(path, "document has no pages"));
        }

        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let load_time = start.elapsed();
        debug!(page_count, ?load_time, "opened PDF");

        Ok(PdfSource {
            path: path.to_path_buf(),
            document,
            page_count,
            file_size,
            load_time,
        })
    }

    /// Read an image header to learn its pixel dimensions.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn probe_image(&self, path: &Path) -> Result<ImageSource> {
        let (width, height) = image::ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| PageCatError::source_open(path, e.to_string()))?
            .into_dimensions()
            .map_err(|e| PageCatError::source_open(path, e.to_string()))?;

        if width == 0 || height == 0 {
            return Err(PageCatError::source_open(path, "image has no pixels"));
        }

        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        debug!(width, height, "probed image");

        Ok(ImageSource {
            path: path.to_path_buf(),
            width,
            height,
            file_size,
        })
    }
}

impl Default for SourceReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use lopdf::{Object, Stream};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_pdf(dir: &TempDir, name: &str, pages: usize) -> PathBuf {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for _ in 0..pages {
            let content_id = doc.add_object(Stream::new(dictionary! {}, b"".to_vec()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => pages as i64,
                "Kids" => kids,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let path = dir.path().join(name);
        doc.save(&path).unwrap();
        path
    }

    #[test]
    fn test_open_pdf_counts_pages() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "three.pdf", 3);

        let handle = SourceReader::new().open(&path).unwrap();
        assert_eq!(handle.page_count(), 3);
        assert_eq!(handle.kind(), SourceKind::Pdf);
    }

    #[test]
    fn test_open_pdf_rejects_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "empty.pdf", 0);

        let err = SourceReader::new().open(&path).unwrap_err();
        assert!(matches!(err, PageCatError::SourceOpen { .. }));
        assert!(SourceReader::without_verification().open(&path).is_ok());
    }

    #[test]
    fn test_open_corrupt_pdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = SourceReader::new().open(&path).unwrap_err();
        assert!(matches!(err, PageCatError::SourceOpen { .. }));
    }

    #[test]
    fn test_open_missing_file() {
        let err = SourceReader::new()
            .open(Path::new("/nonexistent/file.pdf"))
            .unwrap_err();
        assert!(matches!(err, PageCatError::SourceOpen { .. }));
    }

    #[test]
    fn test_probe_image_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tile.png");
        image::RgbImage::new(40, 25).save(&path).unwrap();

        let handle = SourceReader::new().open(&path).unwrap();
        match handle {
            SourceHandle::Image(img) => {
                assert_eq!((img.width, img.height), (40, 25));
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn test_probe_garbage_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"definitely not png").unwrap();

        let err = SourceReader::new().open(&path).unwrap_err();
        assert!(matches!(err, PageCatError::SourceOpen { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = SourceReader::new().open(&path).unwrap_err();
        assert!(matches!(err, PageCatError::UnsupportedSource { .. }));
    }
}
