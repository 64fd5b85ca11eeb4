//! Page previews.
//!
//! [`PreviewProvider`] renders one [`PageRef`] to an RGBA bitmap. It never
//! touches the page collection, and a failed render is just an error for the
//! caller to log; the previous preview can stay on screen.
//!
//! Images are decoded directly and the requested resolution is ignored. PDF
//! pages need a [`PdfRasterizer`]; with the `pdfium` feature one backed by
//! the system pdfium library is available.

use std::path::Path;

use tracing::{debug, instrument};

use crate::error::{PageCatError, Result};
use crate::page::{PageRef, SourceKind};

/// Rendered preview.
pub type Bitmap = image::RgbaImage;

/// Default preview resolution.
pub const PREVIEW_DPI: f32 = 72.0;

/// Rasterizes single PDF pages.
pub trait PdfRasterizer {
    /// Render page `page_index` (zero-based) of the PDF at `path`.
    fn rasterize(&self, path: &Path, page_index: usize, dpi: f32) -> Result<Bitmap>;
}

/// Renders page references for display.
#[derive(Default)]
pub struct PreviewProvider {
    rasterizer: Option<Box<dyn PdfRasterizer>>,
}

impl PreviewProvider {
    /// Provider that can preview images only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that previews PDF pages with `rasterizer`.
    pub fn with_rasterizer(rasterizer: impl PdfRasterizer + 'static) -> Self {
        Self {
            rasterizer: Some(Box::new(rasterizer)),
        }
    }

    /// Provider using pdfium when the `pdfium` feature is enabled and the
    /// library can be found, images only otherwise.
    pub fn detect() -> Self {
        #[cfg(feature = "pdfium")]
        match pdfium::PdfiumRasterizer::new() {
            Ok(r) => return Self::with_rasterizer(r),
            Err(e) => tracing::warn!(error = %e, "PDF previews unavailable"),
        }
        Self::new()
    }

    /// Whether PDF pages can be previewed.
    pub fn can_render_pdf(&self) -> bool {
        self.rasterizer.is_some()
    }

    /// Render `page` at `dpi`.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::Preview`] if the source cannot be decoded or no
    /// PDF rasterizer is configured.
    #[instrument(skip(self), fields(label = %page.label))]
    pub fn render(&self, page: &PageRef, dpi: f32) -> Result<Bitmap> {
        let bitmap = match page.source_kind {
            SourceKind::Image => decode_image(&page.source_path)?,
            SourceKind::Pdf => {
                let rasterizer = self.rasterizer.as_ref().ok_or_else(|| {
                    PageCatError::preview("no PDF rasterizer available (build with `pdfium`)")
                })?;
                let index = page.page_index.ok_or_else(|| {
                    PageCatError::preview(format!(
                        "{}: PDF page reference has no page index",
                        page.source_path.display()
                    ))
                })?;
                rasterizer.rasterize(&page.source_path, index, dpi)?
            }
        };
        debug!(width = bitmap.width(), height = bitmap.height(), "preview rendered");
        Ok(bitmap)
    }
}

impl std::fmt::Debug for PreviewProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewProvider")
            .field("pdf", &self.can_render_pdf())
            .finish()
    }
}

fn decode_image(path: &Path) -> Result<Bitmap> {
    image::ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| PageCatError::preview(format!("{}: {e}", path.display())))?
        .decode()
        .map(|img| img.to_rgba8())
        .map_err(|e| PageCatError::preview(format!("{}: {e}", path.display())))
}

#[cfg(feature = "pdfium")]
pub mod pdfium {
    //! pdfium-backed rasterizer.

    use std::path::Path;

    use pdfium_render::prelude::*;

    use super::{Bitmap, PdfRasterizer};
    use crate::error::{PageCatError, Result};

    /// Renders PDF pages with pdfium.
    pub struct PdfiumRasterizer {
        pdfium: Pdfium,
    }

    impl PdfiumRasterizer {
        /// Bind to pdfium in the working directory, then the system library.
        pub fn new() -> Result<Self> {
            let local = Pdfium::pdfium_platform_library_name_at_path("./");
            let bindings = Pdfium::bind_to_library(&local)
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| PageCatError::preview(format!("failed to bind pdfium: {e}")))?;
            Ok(Self {
                pdfium: Pdfium::new(bindings),
            })
        }
    }

    impl PdfRasterizer for PdfiumRasterizer {
        fn rasterize(&self, path: &Path, page_index: usize, dpi: f32) -> Result<Bitmap> {
            let fail = |e: String| PageCatError::preview(format!("{}: {e}", path.display()));

            let document = self
                .pdfium
                .load_pdf_from_file(path, None)
                .map_err(|e| fail(e.to_string()))?;
            let index = PdfPageIndex::try_from(page_index)
                .map_err(|_| fail(format!("page {} is out of range", page_index + 1)))?;
            let page = document
                .pages()
                .get(index)
                .map_err(|e| fail(e.to_string()))?;

            let config = PdfRenderConfig::new().scale_page_by_factor((dpi / 72.0).max(0.1));
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| fail(e.to_string()))?;

            let width = u32::try_from(bitmap.width()).unwrap_or_default();
            let height = u32::try_from(bitmap.height()).unwrap_or_default();
            Bitmap::from_raw(width, height, bitmap.as_rgba_bytes())
                .ok_or_else(|| fail("rendered bitmap has an unexpected size".to_string()))
        }
    }
}
