//! Command-line arguments.
//!
//! Also compiled into `build.rs` to generate the man page, so this file may
//! only depend on `clap` and the `pagecat` library.

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use pagecat::config::{
    CompressionLevel, Config, ExportOptions, MergePlan, Metadata, OverwriteMode, PageSelection,
};
use pagecat::error::{PageCatError, Result};
use pagecat::merge::IMAGE_DPI;
use pagecat::utils::collect_paths_for_patterns;

/// Arrange pages from PDF documents and images into a single PDF.
///
/// Inputs are taken in the order given. Every page of each PDF is added in
/// order unless --pages selects otherwise; each image becomes one full page.
#[derive(Parser, Debug)]
#[command(name = "pagecat")]
#[command(version)]
#[command(about = "Arrange pages from PDF documents and images into a single PDF", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input files or glob patterns, in output order
    ///
    /// PDF documents and raster images (jpg, jpeg, png, bmp, gif, tif,
    /// tiff, webp) can be mixed freely.
    ///
    /// Examples:
    ///   pagecat cover.png report.pdf -o out.pdf
    ///   pagecat 'scans/*.jpg' -o scans.pdf
    #[arg(value_name = "FILE", required_unless_present = "plan")]
    pub inputs: Vec<String>,

    /// Read the ordered source list from a JSON merge plan
    ///
    /// The plan lists entries with a path and an optional page selection:
    ///   {"entries": [{"path": "a.pdf", "pages": "3,1-2"}, {"path": "b.png"}]}
    /// Relative paths resolve against the plan file's directory.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["inputs", "pages"])]
    pub plan: Option<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Pages to take from every PDF input, 1-indexed (e.g. "3,1-2")
    ///
    /// Pages are added in the order written and may repeat.
    #[arg(short, long, value_name = "PAGES")]
    pub pages: Option<String>,

    /// Open every source and print the page order without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show per-page details and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite an existing output file without asking
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Add one bookmark per run of consecutive pages from the same source
    #[arg(short, long)]
    pub bookmarks: bool,

    /// Stream compression for the output
    ///
    /// - none: leave streams uncompressed
    /// - standard: compress streams (default)
    /// - maximum: also drop unused objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Resolution used to size image pages, in dots per inch
    #[arg(long, value_name = "DPI", default_value_t = IMAGE_DPI)]
    pub dpi: f32,

    /// Document title
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Document author
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Document subject
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Document keywords (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Skip sources that fail to open instead of stopping
    #[arg(long)]
    pub continue_on_error: bool,
}

impl Cli {
    /// Build the run configuration, expanding globs or loading the plan.
    ///
    /// # Errors
    ///
    /// Returns an error for a bad option value, an unreadable plan, a
    /// malformed glob, or a configuration [`Config::validate`] rejects.
    pub fn to_config(&self) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let plan = match &self.plan {
            Some(path) => MergePlan::from_json_file(path)?,
            None => {
                let pages = self.pages.as_deref().map(PageSelection::parse).transpose()?;
                let inputs = collect_paths_for_patterns(&self.inputs)?;
                MergePlan::from_inputs(&inputs, pages.as_ref())
            }
        };

        let metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );

        let config = Config {
            plan,
            output: self.output.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode,
            continue_on_error: self.continue_on_error,
            export: ExportOptions {
                compression,
                metadata,
                bookmarks: self.bookmarks,
                image_dpi: self.dpi,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks that need no file access.
    ///
    /// # Errors
    ///
    /// Returns an error for missing inputs, an unknown compression level, a
    /// malformed page selection or a non-positive resolution.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && self.plan.is_none() {
            return Err(PageCatError::invalid_config("No input files specified"));
        }

        CompressionLevel::from_str(&self.compression)?;

        if let Some(pages) = &self.pages {
            PageSelection::parse(pages)?;
        }

        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(PageCatError::invalid_config(format!(
                "--dpi must be a positive number, got {}",
                self.dpi
            )));
        }

        Ok(())
    }
}
