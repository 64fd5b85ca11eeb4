//! Output assembly.
//!
//! - [`exporter`] walks a page sequence and builds the output document
//! - [`import`] copies PDF pages and the objects they reach
//! - [`image_page`] turns raster images into full pages
//! - [`bookmarks`] and [`metadata`] decorate the result

pub mod bookmarks;
pub mod exporter;
pub mod image_page;
pub mod import;
pub mod metadata;

pub use exporter::{CancellationToken, ExportReport, ExportStatistics, MergeExporter};
pub use image_page::IMAGE_DPI;
