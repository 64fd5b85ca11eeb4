//! Source cache.
//!
//! [`SourceCache`] holds at most one open handle per source path for the life
//! of a session. Handles are owned by the cache; other components borrow them
//! for the duration of a call.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lopdf::Document;
use tracing::debug;

use crate::error::Result;
use crate::io::reader::SourceReader;
use crate::page::SourceKind;

/// A parsed PDF document.
#[derive(Debug)]
pub struct PdfSource {
    /// Path the document was opened from.
    pub path: PathBuf,
    /// Parsed document.
    pub document: Document,
    /// Number of pages.
    pub page_count: usize,
    /// File size in bytes.
    pub file_size: u64,
    /// Time taken to parse.
    pub load_time: Duration,
}

/// A probed raster image. Pixels are decoded on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    /// Path the image was probed from.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// File size in bytes.
    pub file_size: u64,
}

/// An opened source.
#[derive(Debug)]
pub enum SourceHandle {
    /// Multi-page PDF.
    Pdf(PdfSource),
    /// Single-page image.
    Image(ImageSource),
}

impl SourceHandle {
    /// Kind of the source.
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Pdf(_) => SourceKind::Pdf,
            Self::Image(_) => SourceKind::Image,
        }
    }

    /// Number of pages this source contributes when added whole.
    pub fn page_count(&self) -> usize {
        match self {
            Self::Pdf(pdf) => pdf.page_count,
            Self::Image(_) => 1,
        }
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        match self {
            Self::Pdf(pdf) => &pdf.path,
            Self::Image(img) => &img.path,
        }
    }

    /// File size in bytes.
    pub fn file_size(&self) -> u64 {
        match self {
            Self::Pdf(pdf) => pdf.file_size,
            Self::Image(img) => img.file_size,
        }
    }
}

/// Path-keyed memoization of opened sources.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<PathBuf, SourceHandle>,
    reader: SourceReader,
}

impl SourceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache that opens sources with `reader`.
    pub fn with_reader(reader: SourceReader) -> Self {
        Self {
            entries: HashMap::new(),
            reader,
        }
    }

    /// Normalize a path into a cache key.
    ///
    /// Existing files are canonicalized so that `./a.pdf` and `/abs/a.pdf`
    /// share one entry. Paths that cannot be resolved are used as given.
    pub fn normalize(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }

    /// Return the handle for `path`, opening it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::SourceOpen`](crate::error::PageCatError::SourceOpen)
    /// or [`PageCatError::UnsupportedSource`](crate::error::PageCatError::UnsupportedSource)
    /// if the source cannot be opened. Failures are not cached.
    pub fn get(&mut self, path: &Path) -> Result<&SourceHandle> {
        let key = if self.entries.contains_key(path) {
            path.to_path_buf()
        } else {
            Self::normalize(path)
        };

        if !self.entries.contains_key(&key) {
            let handle = self.reader.open(&key)?;
            debug!(path = %key.display(), pages = handle.page_count(), "source cached");
            self.entries.insert(key.clone(), handle);
        }

        // Inserted above when absent.
        Ok(&self.entries[&key])
    }

    /// Whether `path` has an open handle.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path) || self.entries.contains_key(&Self::normalize(path))
    }

    /// Number of open handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handles are open.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Release the handle for `path`. Returns false if it was not open.
    pub fn release(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
            || self.entries.remove(&Self::normalize(path)).is_some()
    }

    /// Release every handle.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, handle: SourceHandle) {
        self.entries.insert(handle.path().to_path_buf(), handle);
    }
}
