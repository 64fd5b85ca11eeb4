//! Editing session.
//!
//! A [`Session`] owns the page collection and the source cache, and is the
//! only thing that mutates either. Front ends add files, edit the order and
//! export through it.
//!
//! Export runs against a snapshot. [`Session::begin_export`] hands the
//! snapshot and the cache to an [`ExportJob`] that may run on another thread;
//! until [`Session::finish_export`] takes the job back, every mutation fails
//! with [`PageCatError::ExportInProgress`].
//!
//! ```no_run
//! use pagecat::merge::CancellationToken;
//! use pagecat::session::Session;
//! use std::path::{Path, PathBuf};
//!
//! let mut session = Session::default();
//! let report = session
//!     .add_files(&[PathBuf::from("a.pdf"), PathBuf::from("cover.png")])
//!     .unwrap();
//! for failure in &report.failures {
//!     eprintln!("{}", failure.error);
//! }
//! session.move_to(session.len() - 1, 0).unwrap();
//! session
//!     .export(Path::new("out.pdf"), &CancellationToken::new(), None)
//!     .unwrap();
//! ```

use std::cell::RefCell;
use std::mem;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{info, instrument, warn};

use crate::collection::{CollectionEvent, PageCollection, SubscriptionId};
use crate::config::{ExportOptions, MergePlan, PageSelection};
use crate::error::{PageCatError, Result};
use crate::merge::{CancellationToken, ExportReport, MergeExporter};
use crate::page::{PageRef, SourceKind};
use crate::preview::{Bitmap, PreviewProvider};
use crate::reorder::ReorderEngine;
use crate::source::SourceCache;
use crate::view::ListView;

/// A source that could not be added.
#[derive(Debug)]
pub struct SourceFailure {
    /// Path as given by the caller.
    pub path: PathBuf,
    /// Why it was skipped.
    pub error: PageCatError,
}

/// Outcome of a batch add.
#[derive(Debug, Default)]
pub struct AddReport {
    /// Sources that contributed pages.
    pub sources_added: usize,
    /// Pages appended to the collection.
    pub pages_added: usize,
    /// Sources that were skipped, in input order.
    pub failures: Vec<SourceFailure>,
}

impl AddReport {
    /// Whether every source was added.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn merge(&mut self, other: AddReport) {
        self.sources_added += other.sources_added;
        self.pages_added += other.pages_added;
        self.failures.extend(other.failures);
    }
}

/// A snapshot export detached from its session.
///
/// Owns everything it reads, so it can move to a worker thread.
#[derive(Debug)]
pub struct ExportJob {
    pages: Vec<PageRef>,
    cache: SourceCache,
    exporter: MergeExporter,
}

impl ExportJob {
    /// Pages being exported, in output order.
    pub fn pages(&self) -> &[PageRef] {
        &self.pages
    }

    /// Assemble the snapshot and write it to `output`.
    ///
    /// # Errors
    ///
    /// See [`MergeExporter::export`].
    pub fn run(
        &mut self,
        output: &Path,
        cancel: &CancellationToken,
        progress: Option<&mut dyn FnMut(usize, usize)>,
    ) -> Result<ExportReport> {
        self.exporter
            .export(&self.pages, &mut self.cache, output, cancel, progress)
    }
}

/// Collection, cache, reorder state and preview for one editing session.
#[derive(Debug, Default)]
pub struct Session {
    collection: PageCollection,
    cache: SourceCache,
    reorder: ReorderEngine,
    preview: PreviewProvider,
    exporter: MergeExporter,
    exporting: bool,
}

impl Session {
    /// Empty session exporting with `options`. PDF previews are available
    /// when pdfium can be bound.
    pub fn new(options: ExportOptions) -> Self {
        Self {
            exporter: MergeExporter::new(options),
            preview: PreviewProvider::detect(),
            ..Default::default()
        }
    }

    /// Use `preview` for [`Session::preview`].
    pub fn with_preview(mut self, preview: PreviewProvider) -> Self {
        self.preview = preview;
        self
    }

    /// Export options in use.
    pub fn options(&self) -> &ExportOptions {
        self.exporter.options()
    }

    /// Replace the export options.
    pub fn set_options(&mut self, options: ExportOptions) -> Result<()> {
        self.ensure_idle()?;
        self.exporter = MergeExporter::new(options);
        Ok(())
    }

    /// The page collection, read-only.
    pub fn collection(&self) -> &PageCollection {
        &self.collection
    }

    /// Current pages in output order.
    pub fn pages(&self) -> &[PageRef] {
        self.collection.pages()
    }

    /// Number of queued pages.
    pub fn len(&self) -> usize {
        self.collection.len()
    }

    /// Whether no pages are queued.
    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// Number of open source handles.
    pub fn open_sources(&self) -> usize {
        self.cache.len()
    }

    /// Whether an export snapshot is checked out.
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// "N page(s) queued".
    pub fn status_line(&self) -> String {
        format!("{} page(s) queued", self.collection.len())
    }

    /// Register a collection subscriber.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&CollectionEvent<'_>) + 'static,
    {
        self.collection.subscribe(subscriber)
    }

    /// Remove a collection subscriber.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.collection.unsubscribe(id)
    }

    /// Attach a list view that follows the collection.
    pub fn attach_view(&mut self) -> (Rc<RefCell<ListView>>, SubscriptionId) {
        ListView::attach(&mut self.collection)
    }

    /// Add every page of each file, in order.
    ///
    /// A file that cannot be opened is recorded in the report and skipped;
    /// the rest are still added.
    ///
    /// # Errors
    ///
    /// Only [`PageCatError::ExportInProgress`].
    pub fn add_files(&mut self, paths: &[PathBuf]) -> Result<AddReport> {
        self.ensure_idle()?;
        let mut report = AddReport::default();
        for path in paths {
            report.merge(self.add_source(path, None));
        }
        Ok(report)
    }

    /// Add the selected pages of one file. Images take no selection.
    ///
    /// # Errors
    ///
    /// Only [`PageCatError::ExportInProgress`]; source failures are in the
    /// report.
    pub fn add_pages(&mut self, path: &Path, pages: Option<&PageSelection>) -> Result<AddReport> {
        self.ensure_idle()?;
        Ok(self.add_source(path, pages))
    }

    /// Add every entry of a merge plan, in order.
    ///
    /// # Errors
    ///
    /// Only [`PageCatError::ExportInProgress`].
    pub fn add_plan(&mut self, plan: &MergePlan) -> Result<AddReport> {
        self.ensure_idle()?;
        let mut report = AddReport::default();
        for entry in &plan.entries {
            report.merge(self.add_source(&entry.path, entry.pages.as_ref()));
        }
        Ok(report)
    }

    /// Remove the page at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<PageRef> {
        self.ensure_idle()?;
        self.reorder.drag_end();
        self.collection.remove_at(index)
    }

    /// Remove several pages. Nothing is removed if any index is invalid.
    pub fn remove_many(&mut self, indices: &[usize]) -> Result<Vec<PageRef>> {
        self.ensure_idle()?;
        self.reorder.drag_end();
        self.collection.remove_many(indices)
    }

    /// Move the page at `from` to `to`.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<()> {
        self.ensure_idle()?;
        self.reorder.drag_end();
        self.collection.move_to(from, to)
    }

    /// Move the page at `row` one place up. Returns its new row.
    pub fn move_up(&mut self, row: usize) -> Result<usize> {
        self.ensure_idle()?;
        self.reorder.drag_end();
        ReorderEngine::move_up(&mut self.collection, row)
    }

    /// Move the page at `row` one place down. Returns its new row.
    pub fn move_down(&mut self, row: usize) -> Result<usize> {
        self.ensure_idle()?;
        self.reorder.drag_end();
        ReorderEngine::move_down(&mut self.collection, row)
    }

    /// Start dragging the page at `row`.
    pub fn drag_start(&mut self, row: usize) -> Result<()> {
        self.ensure_idle()?;
        self.reorder.drag_start(&self.collection, row)
    }

    /// Drag over `row`, committing the move. See [`ReorderEngine::drag_move`].
    pub fn drag_move(&mut self, row: i64) -> Result<Option<usize>> {
        self.ensure_idle()?;
        self.reorder.drag_move(&mut self.collection, row)
    }

    /// Finish the current drag.
    pub fn drag_end(&mut self) {
        self.reorder.drag_end();
    }

    /// Remove every page and close every source.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.reorder.drag_end();
        self.collection.clear();
        self.cache.clear();
        Ok(())
    }

    /// Render a preview of the page at `index`.
    ///
    /// # Errors
    ///
    /// [`PageCatError::IndexOutOfRange`] for a bad index, otherwise whatever
    /// the preview provider reports. The collection is never touched.
    pub fn preview(&self, index: usize, dpi: f32) -> Result<Bitmap> {
        let page = self
            .collection
            .get(index)
            .ok_or_else(|| PageCatError::index_out_of_range(index, self.collection.len()))?;
        self.preview.render(page, dpi)
    }

    /// Check out a snapshot export.
    ///
    /// The job owns the cache until it is returned with
    /// [`finish_export`](Self::finish_export).
    ///
    /// # Errors
    ///
    /// [`PageCatError::ExportInProgress`] if a job is already out,
    /// [`PageCatError::NothingToExport`] if the collection is empty.
    pub fn begin_export(&mut self) -> Result<ExportJob> {
        self.ensure_idle()?;
        if self.collection.is_empty() {
            return Err(PageCatError::NothingToExport);
        }
        self.reorder.drag_end();
        self.exporting = true;
        Ok(ExportJob {
            pages: self.collection.snapshot(),
            cache: mem::take(&mut self.cache),
            exporter: self.exporter.clone(),
        })
    }

    /// Return a job's cache and unlock the session.
    pub fn finish_export(&mut self, job: ExportJob) {
        self.cache = job.cache;
        self.exporting = false;
    }

    /// Export the current collection to `output` on this thread.
    ///
    /// # Errors
    ///
    /// See [`begin_export`](Self::begin_export) and [`ExportJob::run`].
    #[instrument(skip_all, fields(output = %output.display(), pages = self.collection.len()))]
    pub fn export(
        &mut self,
        output: &Path,
        cancel: &CancellationToken,
        progress: Option<&mut dyn FnMut(usize, usize)>,
    ) -> Result<ExportReport> {
        let mut job = self.begin_export()?;
        let result = job.run(output, cancel, progress);
        self.finish_export(job);
        result
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.exporting {
            Err(PageCatError::ExportInProgress)
        } else {
            Ok(())
        }
    }

    fn add_source(&mut self, path: &Path, selection: Option<&PageSelection>) -> AddReport {
        match self.open_pages(path, selection) {
            Ok(pages) => {
                info!(path = %path.display(), pages = pages.len(), "source added");
                let count = pages.len();
                for page in pages {
                    self.collection.append(page);
                }
                AddReport {
                    sources_added: 1,
                    pages_added: count,
                    failures: Vec::new(),
                }
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "source skipped");
                AddReport {
                    failures: vec![SourceFailure {
                        path: path.to_path_buf(),
                        error,
                    }],
                    ..Default::default()
                }
            }
        }
    }

    fn open_pages(&mut self, path: &Path, selection: Option<&PageSelection>) -> Result<Vec<PageRef>> {
        let kind = SourceKind::from_path(path)?;
        let key = SourceCache::normalize(path);
        let page_count = self.cache.get(&key)?.page_count();

        match kind {
            SourceKind::Pdf => {
                let indices = match selection {
                    Some(sel) => sel.indices(page_count)?,
                    None => (0..page_count).collect(),
                };
                Ok(indices.into_iter().map(|i| PageRef::pdf(&key, i)).collect())
            }
            SourceKind::Image => match selection {
                Some(sel) => Err(PageCatError::invalid_selection(
                    sel.as_str(),
                    "page selections apply to PDF sources only",
                )),
                None => Ok(vec![PageRef::image(&key)]),
            },
        }
    }
}
