//! pagecat - arrange PDF pages and images into one PDF.
//!
//! Sources (PDF documents and raster images) are opened into a
//! [`SourceCache`](source::SourceCache) and expanded into
//! [`PageRef`]s in an ordered [`PageCollection`]. The collection is edited
//! by position, directly or through drag gestures, and exported as a single
//! document: PDF pages are copied object for object, images become full
//! pages at [`IMAGE_DPI`](merge::IMAGE_DPI).
//!
//! # Examples
//!
//! ## Batch merge
//!
//! ```no_run
//! use pagecat::config::{ExportOptions, MergePlan, PageSelection};
//! use pagecat::merge::CancellationToken;
//! use pagecat::Session;
//! use std::path::{Path, PathBuf};
//!
//! # fn example() -> pagecat::Result<()> {
//! let pages = PageSelection::parse("2,1")?;
//! let plan = MergePlan::from_inputs(
//!     &[PathBuf::from("a.pdf"), PathBuf::from("cover.png")],
//!     Some(&pages),
//! );
//!
//! let mut session = Session::new(ExportOptions::default());
//! let added = session.add_plan(&plan)?;
//! assert!(added.is_clean());
//!
//! let report = session.export(Path::new("merged.pdf"), &CancellationToken::new(), None)?;
//! println!("Wrote {} pages", report.statistics.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Editing the order
//!
//! ```
//! use pagecat::{PageCollection, PageRef};
//! use pagecat::reorder::ReorderEngine;
//!
//! let mut pages = PageCollection::new();
//! for i in 0..4 {
//!     pages.append(PageRef::pdf("a.pdf", i));
//! }
//!
//! let mut drag = ReorderEngine::new();
//! drag.drag_start(&pages, 0).unwrap();
//! drag.drag_move(&mut pages, 2).unwrap();
//! drag.drag_end();
//!
//! let order: Vec<_> = pages.pages().iter().map(|p| p.page_index).collect();
//! assert_eq!(order, vec![Some(1), Some(2), Some(0), Some(3)]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod page;
pub mod preview;
pub mod reorder;
pub mod session;
pub mod source;
pub mod utils;
pub mod view;

pub use collection::PageCollection;
pub use config::Config;
pub use error::{PageCatError, Result};
pub use page::{PageRef, SourceKind};
pub use session::Session;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
