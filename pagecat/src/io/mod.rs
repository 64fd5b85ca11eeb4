//! File I/O for pagecat.
//!
//! - [`reader`] opens sources (PDF parsing, image header probing)
//! - [`writer`] writes the assembled document atomically

pub mod reader;
pub mod writer;

pub use reader::SourceReader;
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
