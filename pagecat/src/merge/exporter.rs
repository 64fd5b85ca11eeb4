//! Flattening a page sequence into one PDF.
//!
//! The exporter walks a snapshot of the page collection in order and appends
//! one output page per entry: PDF pages are copied as objects, images are
//! embedded as full-page XObjects. The document is assembled completely in
//! memory and handed to [`PdfWriter`] only when every page succeeded, so a
//! failed or cancelled export never touches the destination.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use lopdf::{Document, Object, dictionary};
use tracing::{debug, info, instrument};

use crate::config::ExportOptions;
use crate::error::{PageCatError, Result};
use crate::io::writer::{PdfWriter, WriteOptions, WriteStatistics};
use crate::merge::bookmarks::BookmarkManager;
use crate::merge::image_page::{self, EmbeddedImage};
use crate::merge::import::ObjectImporter;
use crate::merge::metadata::MetadataManager;
use crate::page::{PageRef, SourceKind};
use crate::source::{SourceCache, SourceHandle};

/// Cooperative cancellation flag, checked between pages.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Statistics about an assembled document.
#[derive(Debug, Clone, Default)]
pub struct ExportStatistics {
    /// Pages in the output.
    pub total_pages: usize,

    /// Pages copied from PDF sources.
    pub pdf_pages: usize,

    /// Pages synthesized from images.
    pub image_pages: usize,

    /// Distinct sources used.
    pub sources_used: usize,

    /// Total size of the sources used.
    pub input_size: u64,

    /// Outline entries added.
    pub bookmarks_added: usize,

    /// Time spent assembling.
    pub assemble_time: Duration,
}

impl ExportStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        crate::utils::format_file_size(self.input_size)
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Assembly statistics.
    pub statistics: ExportStatistics,

    /// Write statistics.
    pub write: WriteStatistics,
}

/// Assembles and writes output documents.
#[derive(Debug, Clone, Default)]
pub struct MergeExporter {
    options: ExportOptions,
}

impl MergeExporter {
    /// Create an exporter with the given options.
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Options this exporter uses.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Assemble `pages` into a document without writing it.
    ///
    /// `progress` is called after each page with `(done, total)`.
    ///
    /// # Errors
    ///
    /// - [`PageCatError::NothingToExport`] if `pages` is empty
    /// - [`PageCatError::PageIndex`] if a PDF page reference is past the end
    ///   of its source
    /// - [`PageCatError::ImageDecode`] if an image cannot be decoded
    /// - [`PageCatError::PageExport`] if a source is no longer readable or a
    ///   page cannot be copied
    /// - [`PageCatError::Cancelled`] if `cancel` was triggered
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn assemble(
        &self,
        pages: &[PageRef],
        cache: &mut SourceCache,
        cancel: &CancellationToken,
        mut progress: Option<&mut dyn FnMut(usize, usize)>,
    ) -> Result<(Document, ExportStatistics)> {
        if pages.is_empty() {
            return Err(PageCatError::NothingToExport);
        }
        self.options.validate()?;

        let start = Instant::now();
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut importer = ObjectImporter::new();
        let mut images: HashMap<PathBuf, EmbeddedImage> = HashMap::new();
        let mut sources: HashMap<PathBuf, u64> = HashMap::new();
        let mut page_ids = Vec::with_capacity(pages.len());
        let mut stats = ExportStatistics::default();

        for (position, page) in pages.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(position, "export cancelled");
                return Err(PageCatError::Cancelled);
            }

            let at = |err: PageCatError| positioned(err, position, page);

            let handle = cache.get(&page.source_path).map_err(at)?;
            sources.insert(handle.path().to_path_buf(), handle.file_size());

            let page_id = match (page.source_kind, handle) {
                (SourceKind::Pdf, SourceHandle::Pdf(pdf)) => {
                    let index = page.page_index.ok_or_else(|| {
                        PageCatError::page_export(
                            position,
                            &page.source_path,
                            None,
                            "PDF page reference has no page index",
                        )
                    })?;
                    if index >= pdf.page_count {
                        return Err(PageCatError::PageIndex {
                            position,
                            path: page.source_path.clone(),
                            page_index: index,
                            page_count: pdf.page_count,
                        });
                    }
                    stats.pdf_pages += 1;
                    importer
                        .import_page(&mut doc, pdf, index, pages_id)
                        .map_err(at)?
                }
                (SourceKind::Image, SourceHandle::Image(img)) => {
                    let embedded = match images.get(&img.path) {
                        Some(embedded) => *embedded,
                        None => {
                            let pixels = image_page::decode_rgb(&img.path).map_err(|reason| {
                                PageCatError::image_decode(position, &page.source_path, reason)
                            })?;
                            let embedded = image_page::embed_image(&mut doc, &pixels);
                            images.insert(img.path.clone(), embedded);
                            embedded
                        }
                    };
                    stats.image_pages += 1;
                    image_page::add_image_page(&mut doc, embedded, self.options.image_dpi, pages_id)
                        .map_err(at)?
                }
                (kind, handle) => {
                    return Err(PageCatError::page_export(
                        position,
                        &page.source_path,
                        page.page_index,
                        format!(
                            "expected a {} source but found {}",
                            kind.tag(),
                            handle.kind().tag()
                        ),
                    ));
                }
            };

            page_ids.push(page_id);
            if let Some(report) = progress.as_mut() {
                report(position + 1, pages.len());
            }
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
                "Count" => page_ids.len() as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if self.options.bookmarks {
            let entries = BookmarkManager::entries_for(pages);
            stats.bookmarks_added =
                BookmarkManager::new().add_outline(&mut doc, &entries, &page_ids)?;
        }
        MetadataManager::new().set_metadata(&mut doc, &self.options.metadata);

        stats.total_pages = page_ids.len();
        stats.sources_used = sources.len();
        stats.input_size = sources.values().sum();
        stats.assemble_time = start.elapsed();
        debug!(
            total_pages = stats.total_pages,
            sources = stats.sources_used,
            ?stats.assemble_time,
            "document assembled"
        );

        Ok((doc, stats))
    }

    /// Assemble `pages` and write the result to `output`.
    ///
    /// Nothing is written unless every page was assembled and the export was
    /// not cancelled.
    ///
    /// # Errors
    ///
    /// Everything [`assemble`](Self::assemble) returns, plus
    /// [`PageCatError::ExportWrite`] if the destination cannot be written.
    pub fn export(
        &self,
        pages: &[PageRef],
        cache: &mut SourceCache,
        output: &Path,
        cancel: &CancellationToken,
        progress: Option<&mut dyn FnMut(usize, usize)>,
    ) -> Result<ExportReport> {
        let (mut doc, statistics) = self.assemble(pages, cache, cancel, progress)?;

        if cancel.is_cancelled() {
            return Err(PageCatError::Cancelled);
        }

        let writer = PdfWriter::with_options(WriteOptions {
            compression: self.options.compression,
            ..Default::default()
        });
        let write = writer.save(&mut doc, output)?;

        info!(
            pages = statistics.total_pages,
            output = %output.display(),
            size = write.file_size,
            "export complete"
        );
        Ok(ExportReport { statistics, write })
    }
}

/// Attach the output position to a failure that does not carry one.
fn positioned(err: PageCatError, position: usize, page: &PageRef) -> PageCatError {
    match err {
        PageCatError::PageIndex { .. }
        | PageCatError::ImageDecode { .. }
        | PageCatError::PageExport { .. }
        | PageCatError::Cancelled => err,
        other => PageCatError::page_export(
            position,
            &page.source_path,
            page.page_index,
            other.to_string(),
        ),
    }
}
