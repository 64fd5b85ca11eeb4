//! Configuration for pagecat.
//!
//! This module turns user input into validated settings that drive an export:
//! - Export options (compression, metadata, bookmarks, image resolution)
//! - Page selections ("1-3,5")
//! - Merge plans: ordered lists of sources, from a JSON file or from the CLI
//! - Overwrite behavior and output-mode flags

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{PageCatError, Result};
use crate::merge::image_page::IMAGE_DPI;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - streams are written decoded.
    None,
    /// Compress streams.
    #[default]
    Standard,
    /// Compress streams and drop unreachable objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PageCatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PageCatError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// 1-indexed page selection applied to a PDF source.
///
/// Selections keep the order they were written in and may repeat pages:
/// `"3,1,1"` yields page 3, then page 1 twice.
///
/// - "1" - single page
/// - "1-5" - range of pages (inclusive)
/// - "5,1-3" - pages 5, 1, 2, 3
///
/// # Examples
///
/// ```
/// use pagecat::config::PageSelection;
///
/// let sel: PageSelection = "3,1-2".parse().unwrap();
/// assert_eq!(sel.indices(4).unwrap(), vec![2, 0, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    source: String,
    items: Vec<SelectionItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionItem {
    Single(usize),
    Range(usize, usize),
}

impl PageSelection {
    /// Parse a selection string.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::InvalidSelection`] for empty input, page 0,
    /// non-numeric parts, or a range whose start exceeds its end.
    pub fn parse(s: &str) -> Result<Self> {
        parse_items(s)
            .map(|items| Self {
                source: s.trim().to_string(),
                items,
            })
            .map_err(|e| PageCatError::invalid_selection(s, format!("{e:#}")))
    }

    /// Resolve to zero-based page indices for a document with `page_count`
    /// pages.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::InvalidSelection`] if any selected page is past
    /// the end of the document.
    pub fn indices(&self, page_count: usize) -> Result<Vec<usize>> {
        let mut out = Vec::new();
        for item in &self.items {
            let (start, end) = match *item {
                SelectionItem::Single(p) => (p, p),
                SelectionItem::Range(s, e) => (s, e),
            };
            if end > page_count {
                return Err(PageCatError::invalid_selection(
                    &self.source,
                    format!("page {end} is past the end of a {page_count}-page document"),
                ));
            }
            out.extend((start..=end).map(|p| p - 1));
        }
        Ok(out)
    }

    /// The selection as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for PageSelection {
    type Err = PageCatError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for PageSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for PageSelection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for PageSelection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_items(s: &str) -> anyhow::Result<Vec<SelectionItem>> {
    let mut items = Vec::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            bail!("Empty entry in page selection");
        }

        if let Some((start, end)) = part.split_once('-') {
            let start: usize = start
                .trim()
                .parse()
                .with_context(|| format!("Invalid page number: {start}"))?;
            let end: usize = end
                .trim()
                .parse()
                .with_context(|| format!("Invalid page number: {end}"))?;

            if start == 0 || end == 0 {
                bail!("Page numbers must be positive (1-indexed)");
            }
            if start > end {
                bail!("Invalid range {start}-{end}: start page must not exceed end page");
            }
            items.push(SelectionItem::Range(start, end));
        } else {
            let page: usize = part
                .parse()
                .with_context(|| format!("Invalid page number: {part}"))?;
            if page == 0 {
                bail!("Page numbers must be positive (1-indexed)");
            }
            items.push(SelectionItem::Single(page));
        }
    }

    Ok(items)
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, dropping blank values.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let clean = |opt: Option<String>| {
            opt.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        Self {
            title: clean(title),
            author: clean(author),
            subject: clean(subject),
            keywords: clean(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Settings for one export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Stream compression for the output.
    pub compression: CompressionLevel,

    /// Info dictionary entries.
    pub metadata: Metadata,

    /// Add one outline entry per run of pages from the same source.
    pub bookmarks: bool,

    /// Resolution used to size image pages.
    pub image_dpi: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
            bookmarks: false,
            image_dpi: IMAGE_DPI,
        }
    }
}

impl ExportOptions {
    /// Check option values.
    pub fn validate(&self) -> Result<()> {
        if !(self.image_dpi.is_finite() && self.image_dpi > 0.0) {
            return Err(PageCatError::invalid_config(format!(
                "Image resolution must be a positive number, got {}",
                self.image_dpi
            )));
        }
        Ok(())
    }
}

/// One source in a merge plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Source path.
    pub path: PathBuf,

    /// Pages to take from a PDF source. All pages in order when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<PageSelection>,
}

impl PlanEntry {
    /// Entry contributing every page of `path`.
    pub fn whole(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pages: None,
        }
    }
}

/// Ordered list of sources for a batch merge.
///
/// ```json
/// { "entries": [ { "path": "a.pdf", "pages": "2,1" }, { "path": "cover.png" } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePlan {
    /// Sources in output order.
    pub entries: Vec<PlanEntry>,
}

impl MergePlan {
    /// Build a plan from input paths, applying `pages` to every PDF input.
    pub fn from_inputs(inputs: &[PathBuf], pages: Option<&PageSelection>) -> Self {
        let entries = inputs
            .iter()
            .map(|path| {
                let is_pdf = path
                    .extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
                PlanEntry {
                    path: path.clone(),
                    pages: pages.filter(|_| is_pdf).cloned(),
                }
            })
            .collect();
        Self { entries }
    }

    /// Load a plan from a JSON file. Relative entry paths resolve against the
    /// plan file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::InvalidPlan`] if the file cannot be read or
    /// parsed, or lists no entries.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let invalid = |reason: String| PageCatError::InvalidPlan {
            path: path.to_path_buf(),
            reason,
        };

        let text = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let mut plan: Self = serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;

        if plan.entries.is_empty() {
            return Err(invalid("plan lists no entries".to_string()));
        }

        if let Some(base) = path.parent() {
            for entry in &mut plan.entries {
                if entry.path.is_relative() {
                    entry.path = base.join(&entry.path);
                }
            }
        }

        Ok(plan)
    }

    /// Source paths in plan order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.path.as_path())
    }

    /// Whether the plan lists no sources.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Complete configuration for a batch run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Sources in output order.
    pub plan: MergePlan,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Load sources and report the plan without writing.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Skip sources that fail to open instead of aborting.
    pub continue_on_error: bool,

    /// Export settings.
    pub export: ExportOptions,
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No inputs are specified
    /// - Verbose and quiet modes are both enabled
    /// - The output path is also an input
    /// - Export options are out of range
    pub fn validate(&self) -> Result<()> {
        if self.plan.is_empty() {
            return Err(PageCatError::invalid_config("No input files specified"));
        }

        if self.verbose && self.quiet {
            return Err(PageCatError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        for input in self.plan.paths() {
            if same_file(input, &self.output) {
                return Err(PageCatError::invalid_config(format!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                )));
            }
        }

        self.export.validate()
    }

    /// Whether progress and summaries should be printed.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
