//! Output writing.
//!
//! The assembled document is serialized to a temporary file next to the
//! destination and renamed over it only once everything has been flushed. A
//! failed write removes the temporary file and leaves any existing file at the
//! destination untouched.
//!
//! # Examples
//!
//! ```no_run
//! use pagecat::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let stats = PdfWriter::new().save(&mut doc, Path::new("output.pdf"))?;
//! println!("Wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lopdf::Document;
use tracing::{debug, instrument, warn};

use crate::config::CompressionLevel;
use crate::error::{PageCatError, Result};
use crate::utils::format_file_size;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// How hard to compress streams.
    pub compression: CompressionLevel,

    /// Renumber objects before writing.
    pub optimize: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: CompressionLevel::Standard,
            optimize: true,
            buffer_size: 64 * 1024,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Compression that was applied.
    pub compression: CompressionLevel,

    /// Whether objects were renumbered.
    pub optimized: bool,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Atomic PDF writer.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer that leaves streams uncompressed.
    pub fn without_compression() -> Self {
        Self {
            options: WriteOptions {
                compression: CompressionLevel::None,
                ..Default::default()
            },
        }
    }

    /// Write `doc` to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::ExportWrite`] if the temporary file cannot be
    /// created, written or renamed into place. Nothing is left at `path` that
    /// was not there before.
    #[instrument(skip(self, doc), fields(path = %path.display()))]
    pub fn save(&self, doc: &mut Document, path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();
        let options = &self.options;

        match options.compression {
            CompressionLevel::None => doc.decompress(),
            CompressionLevel::Standard => doc.compress(),
            CompressionLevel::Maximum => {
                doc.prune_objects();
                doc.delete_zero_length_streams();
                doc.compress();
            }
        }

        if options.optimize {
            doc.renumber_objects();
        }

        let temp_path = temp_path_for(path);
        if let Err(e) = write_to(doc, &temp_path, options.buffer_size) {
            discard(&temp_path);
            return Err(PageCatError::ExportWrite {
                path: path.to_path_buf(),
                source: e,
            });
        }

        if let Err(e) = std::fs::rename(&temp_path, path) {
            discard(&temp_path);
            return Err(PageCatError::ExportWrite {
                path: path.to_path_buf(),
                source: e,
            });
        }

        let write_time = start.elapsed();
        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        debug!(file_size, ?write_time, "output written");

        Ok(WriteStatistics {
            write_time,
            file_size,
            output_path: path.to_path_buf(),
            compression: options.compression,
            optimized: options.optimize,
        })
    }

    /// Check that the parent directory of `path` exists and is writable.
    pub fn can_write(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => return Ok(()),
        };

        let metadata = std::fs::metadata(parent).map_err(|_| {
            PageCatError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            ))
        })?;

        if !metadata.is_dir() {
            return Err(PageCatError::invalid_config(format!(
                "Output parent is not a directory: {}",
                parent.display()
            )));
        }
        if metadata.permissions().readonly() {
            return Err(PageCatError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }
}

fn write_to(doc: &mut Document, path: &Path, buffer_size: usize) -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    let mut writer = std::io::BufWriter::with_capacity(buffer_size, file);
    doc.save_to(&mut writer).map_err(std::io::Error::other)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Temporary file in the destination directory, so the final rename stays on
/// one filesystem.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.pdf".to_string());
    let unique = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{unique}.tmp", std::process::id()))
}

fn discard(temp_path: &Path) {
    if let Err(e) = std::fs::remove_file(temp_path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %temp_path.display(), error = %e, "failed to remove temporary file");
    }
}
