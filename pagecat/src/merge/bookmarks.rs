//! Document outline for assembled output.
//!
//! One outline entry is created for every run of consecutive pages drawn
//! from the same source, titled with that source's file name and pointing at
//! the first page of the run.

use lopdf::{Dictionary, Document, Object, ObjectId, text_string};

use crate::error::{PageCatError, Result};
use crate::page::PageRef;

/// A single outline entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Visible title.
    pub title: String,
    /// Zero-based output position the entry points at.
    pub position: usize,
}

/// Builds the outline (bookmarks) of an output document.
#[derive(Debug, Default, Clone, Copy)]
pub struct BookmarkManager;

impl BookmarkManager {
    /// Create a new bookmark manager.
    pub fn new() -> Self {
        Self
    }

    /// One entry per run of pages sharing a source path.
    pub fn entries_for(pages: &[PageRef]) -> Vec<OutlineEntry> {
        let mut entries: Vec<OutlineEntry> = Vec::new();
        let mut previous = None;

        for (position, page) in pages.iter().enumerate() {
            if previous != Some(&page.source_path) {
                entries.push(OutlineEntry {
                    title: crate::utils::display_name(&page.source_path),
                    position,
                });
            }
            previous = Some(&page.source_path);
        }
        entries
    }

    /// Attach an outline to `doc`.
    ///
    /// `page_ids` holds the output page objects in output order. Returns the
    /// number of entries added.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no catalog.
    pub fn add_outline(
        &self,
        doc: &mut Document,
        entries: &[OutlineEntry],
        page_ids: &[ObjectId],
    ) -> Result<usize> {
        let items: Vec<(&str, ObjectId)> = entries
            .iter()
            .filter_map(|e| page_ids.get(e.position).map(|id| (e.title.as_str(), *id)))
            .collect();

        if items.is_empty() {
            return Ok(0);
        }

        let outline_id = doc.new_object_id();
        let item_ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

        for (i, ((title, page_id), item_id)) in items.iter().zip(&item_ids).enumerate() {
            let mut item = Dictionary::new();
            item.set("Title", text_string(title));
            item.set("Parent", Object::Reference(outline_id));
            item.set(
                "Dest",
                Object::Array(vec![
                    Object::Reference(*page_id),
                    Object::Name(b"XYZ".to_vec()),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ]),
            );
            if i > 0 {
                item.set("Prev", Object::Reference(item_ids[i - 1]));
            }
            if let Some(next) = item_ids.get(i + 1) {
                item.set("Next", Object::Reference(*next));
            }
            doc.objects.insert(*item_id, Object::Dictionary(item));
        }

        let mut outline = Dictionary::new();
        outline.set("Type", Object::Name(b"Outlines".to_vec()));
        outline.set("Count", Object::Integer(item_ids.len() as i64));
        outline.set("First", Object::Reference(item_ids[0]));
        outline.set("Last", Object::Reference(item_ids[item_ids.len() - 1]));
        doc.objects.insert(outline_id, Object::Dictionary(outline));

        doc.catalog_mut()
            .map_err(|e| PageCatError::other(format!("Failed to attach outline: {e}")))?
            .set("Outlines", Object::Reference(outline_id));

        Ok(item_ids.len())
    }

    /// Check if a document has an outline.
    pub fn has_bookmarks(&self, doc: &Document) -> bool {
        doc.catalog().is_ok_and(|c| c.has(b"Outlines"))
    }
}
