//! Error types for pagecat.
//!
//! Every fallible operation in the crate returns [`PageCatError`]. Errors
//! carry the path, position and page involved so that a single report can
//! name the offending item.
//!
//! # Error Categories
//!
//! - **Source errors**: a file cannot be opened, parsed or is of an unsupported
//!   kind. Recovered per file during an add-files batch.
//! - **Collection errors**: an operation received an invalid position. The
//!   collection is left unchanged.
//! - **Export errors**: a page cannot be read or converted, or the destination
//!   cannot be written. Fatal to that export only.

use std::io;
use std::path::PathBuf;

/// Result type alias for pagecat operations.
pub type Result<T> = std::result::Result<T, PageCatError>;

/// Main error type for pagecat operations.
#[derive(Debug, thiserror::Error)]
pub enum PageCatError {
    /// A source file could not be opened or parsed.
    #[error("Failed to open source: {}\n  Reason: {reason}", path.display())]
    SourceOpen {
        /// Path of the source.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A source file has an extension pagecat does not handle.
    #[error(
        "Unsupported source format: {}\n  Hint: supported formats are {}",
        path.display(),
        crate::page::SUPPORTED_EXTENSIONS.join(", ")
    )]
    UnsupportedSource {
        /// Path of the source.
        path: PathBuf,
    },

    /// A collection operation received a position outside the collection.
    #[error("Position {index} is out of range for a collection of {len} page(s)")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Collection length at the time of the call.
        len: usize,
    },

    /// A page reference points past the end of its source document.
    #[error(
        "Page {} does not exist in {} (output position {}, source has {page_count} page(s))",
        page_index + 1,
        path.display(),
        position + 1
    )]
    PageIndex {
        /// Zero-based position in the output.
        position: usize,
        /// Source document path.
        path: PathBuf,
        /// Zero-based page index that was requested.
        page_index: usize,
        /// Number of pages in the source.
        page_count: usize,
    },

    /// An image could not be decoded or converted for embedding.
    #[error(
        "Failed to decode image at output position {}: {}\n  Reason: {reason}",
        position + 1,
        path.display()
    )]
    ImageDecode {
        /// Zero-based position in the output.
        position: usize,
        /// Image path.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A page could not be placed in the output.
    #[error(
        "Failed to export output position {}: {}{}\n  Reason: {reason}",
        position + 1,
        path.display(),
        describe_page(page_index)
    )]
    PageExport {
        /// Zero-based position in the output.
        position: usize,
        /// Source path.
        path: PathBuf,
        /// Zero-based source page, for PDF references that carry one.
        page_index: Option<usize>,
        /// Reason for the failure.
        reason: String,
    },

    /// The assembled document could not be written to its destination.
    #[error("Failed to write output file: {}\n  Reason: {source}", path.display())]
    ExportWrite {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Export was requested on an empty collection.
    #[error("No pages to export")]
    NothingToExport,

    /// Output file already exists and overwriting is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Existing output path.
        path: PathBuf,
    },

    /// The collection is read-only while an export snapshot is being assembled.
    #[error("An export is in progress; the page list cannot change until it finishes")]
    ExportInProgress,

    /// The operation was cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// A page selection string could not be parsed or applied.
    #[error("Invalid page selection '{selection}': {reason}")]
    InvalidSelection {
        /// The selection as written.
        selection: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A merge plan file could not be read or parsed.
    #[error("Invalid merge plan: {}\n  Reason: {reason}", path.display())]
    InvalidPlan {
        /// Plan file path.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// A preview could not be rendered.
    #[error("Preview unavailable: {reason}")]
    Preview {
        /// Reason for the failure.
        reason: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

fn describe_page(page_index: &Option<usize>) -> String {
    page_index
        .map(|index| format!(" (page {})", index + 1))
        .unwrap_or_default()
}

impl From<lopdf::Error> for PageCatError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PageCatError {
    /// Create a SourceOpen error.
    pub fn source_open(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SourceOpen {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedSource error.
    pub fn unsupported_source(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedSource { path: path.into() }
    }

    /// Create an IndexOutOfRange error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create an ImageDecode error.
    pub fn image_decode(
        position: usize,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ImageDecode {
            position,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a PageExport error.
    pub fn page_export(
        position: usize,
        path: impl Into<PathBuf>,
        page_index: Option<usize>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PageExport {
            position,
            path: path.into(),
            page_index,
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: impl Into<PathBuf>) -> Self {
        Self::OutputExists { path: path.into() }
    }

    /// Create an InvalidSelection error.
    pub fn invalid_selection(selection: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelection {
            selection: selection.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a Preview error.
    pub fn preview(reason: impl Into<String>) -> Self {
        Self::Preview {
            reason: reason.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (a batch can skip the item and continue).
    ///
    /// Only source-level failures qualify. Everything raised during export aborts
    /// the export.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SourceOpen { .. } | Self::UnsupportedSource { .. } | Self::InvalidSelection { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NothingToExport
                | Self::PageIndex { .. }
                | Self::ImageDecode { .. }
                | Self::PageExport { .. }
                | Self::ExportWrite { .. }
                | Self::Cancelled
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SourceOpen { .. } => 3,
            Self::UnsupportedSource { .. } => 3,
            Self::IndexOutOfRange { .. } => 1,
            Self::PageIndex { .. } => 6,
            Self::ImageDecode { .. } => 6,
            Self::PageExport { .. } => 6,
            Self::ExportWrite { .. } => 5,
            Self::NothingToExport => 1,
            Self::OutputExists { .. } => 4,
            Self::ExportInProgress => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::InvalidSelection { .. } => 1,
            Self::InvalidPlan { .. } => 2,
            Self::InvalidConfig { .. } => 1,
            Self::Preview { .. } => 1,
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
