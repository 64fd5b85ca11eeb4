//! Page references.
//!
//! A [`PageRef`] describes one page of the output: which source it comes from
//! and, for PDF sources, which page of that source. Page references are plain
//! values. Two structurally identical references are legal (the same file or
//! the same page added twice) and are told apart only by their position in a
//! [`PageCollection`](crate::collection::PageCollection).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PageCatError, Result};

/// File extensions accepted as page sources, lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp",
];

/// Kind of source a page is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A multi-page PDF document.
    Pdf,
    /// A single-page raster image.
    Image,
}

impl SourceKind {
    /// Determine the source kind from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::UnsupportedSource`] for a missing or unknown
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| PageCatError::unsupported_source(path))?;

        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            other if SUPPORTED_EXTENSIONS.contains(&other) => Ok(Self::Image),
            _ => Err(PageCatError::unsupported_source(path)),
        }
    }

    /// Short tag used in row labels.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Image => "IMG",
        }
    }
}

/// One page of the output document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    /// Kind of the source.
    pub source_kind: SourceKind,

    /// Normalized path of the source.
    pub source_path: PathBuf,

    /// Zero-based page index into the source. Present only for PDF sources.
    pub page_index: Option<usize>,

    /// Display label. Never used to identify a page.
    pub label: String,
}

impl PageRef {
    /// Reference page `page_index` (zero-based) of a PDF document.
    pub fn pdf(path: impl Into<PathBuf>, page_index: usize) -> Self {
        let source_path = path.into();
        let label = format!(
            "[{}] {} - {}p",
            SourceKind::Pdf.tag(),
            crate::utils::display_name(&source_path),
            page_index + 1
        );
        Self {
            source_kind: SourceKind::Pdf,
            source_path,
            page_index: Some(page_index),
            label,
        }
    }

    /// Reference a raster image as a full page.
    pub fn image(path: impl Into<PathBuf>) -> Self {
        let source_path = path.into();
        let label = format!(
            "[{}] {}",
            SourceKind::Image.tag(),
            crate::utils::display_name(&source_path)
        );
        Self {
            source_kind: SourceKind::Image,
            source_path,
            page_index: None,
            label,
        }
    }

    /// Replace the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}
