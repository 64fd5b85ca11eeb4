//! Terminal output for the command-line front end.
//!
//! - [`formatter`] prints status, warnings and errors at the configured
//!   verbosity
//! - [`progress`] draws the export progress bar
//!
//! The `display_*` functions turn library reports into messages.

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{ProgressBar, ProgressStyle};

use crate::merge::ExportReport;
use crate::page::PageRef;
use crate::session::AddReport;

/// Report the outcome of adding sources: one warning per skipped source,
/// then a count.
pub fn display_add_report(formatter: &OutputFormatter, report: &AddReport) {
    for failure in &report.failures {
        formatter.warning(&failure.error.to_string());
    }

    formatter.info(&format!(
        "Added {} source(s): {} page(s){}",
        report.sources_added,
        report.pages_added,
        if report.is_clean() {
            String::new()
        } else {
            format!(", {} skipped", report.failures.len())
        }
    ));
}

/// List the pages that would be exported.
pub fn display_plan(formatter: &OutputFormatter, pages: &[PageRef]) {
    formatter.section(&format!("Export plan ({} page(s)):", pages.len()));
    for (i, page) in pages.iter().enumerate() {
        formatter.list_item(i + 1, &page.label);
    }
}

/// Report a finished export.
pub fn display_export_report(formatter: &OutputFormatter, report: &ExportReport) {
    let stats = &report.statistics;
    formatter.success(&format!(
        "Wrote {} page(s) to {} ({})",
        stats.total_pages,
        report.write.output_path.display(),
        report.write.format_file_size()
    ));

    formatter.detail("PDF pages", &stats.pdf_pages.to_string());
    formatter.detail("Image pages", &stats.image_pages.to_string());
    formatter.detail(
        "Sources",
        &format!("{} ({})", stats.sources_used, stats.format_input_size()),
    );
    if stats.bookmarks_added > 0 {
        formatter.detail("Bookmarks", &stats.bookmarks_added.to_string());
    }
    formatter.detail("Compression", &format!("{:?}", report.write.compression));
    formatter.detail(
        "Time",
        &format!(
            "{:.2}s assembling, {:.2}s writing",
            stats.assemble_time.as_secs_f64(),
            report.write.write_time.as_secs_f64()
        ),
    );
}
