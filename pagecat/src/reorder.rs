//! Drag and discrete reordering.
//!
//! Every drag step commits straight to the [`PageCollection`], so what the
//! user sees during a drag is always the real output order.

use tracing::trace;

use crate::collection::PageCollection;
use crate::error::{PageCatError, Result};

/// Turns pointer drag input into [`PageCollection::move_to`] calls.
#[derive(Debug, Default, Clone)]
pub struct ReorderEngine {
    anchor: Option<usize>,
}

impl ReorderEngine {
    /// Create an idle engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Row currently being dragged, if a drag is active.
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    /// Start dragging the page at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::IndexOutOfRange`] if `row` is not a valid row.
    pub fn drag_start(&mut self, collection: &PageCollection, row: usize) -> Result<()> {
        if row >= collection.len() {
            return Err(PageCatError::index_out_of_range(row, collection.len()));
        }
        trace!(row, "drag start");
        self.anchor = Some(row);
        Ok(())
    }

    /// Pointer moved over `row`. Rows outside the collection are clamped.
    ///
    /// Returns the row the dragged page now occupies, or `None` when no drag
    /// is active or the collection is empty.
    pub fn drag_move(&mut self, collection: &mut PageCollection, row: i64) -> Result<Option<usize>> {
        let Some(anchor) = self.anchor else {
            return Ok(None);
        };
        if collection.is_empty() {
            self.anchor = None;
            return Ok(None);
        }

        let last = collection.len() - 1;
        let target = row.clamp(0, last as i64) as usize;
        if target == anchor {
            return Ok(Some(anchor));
        }

        collection.move_to(anchor, target)?;
        trace!(from = anchor, to = target, "drag move");
        self.anchor = Some(target);
        Ok(Some(target))
    }

    /// Finish the drag. The collection already holds the final order.
    pub fn drag_end(&mut self) {
        self.anchor = None;
    }

    /// Move the page at `row` one position earlier. No-op on the first row.
    ///
    /// Returns the page's new row.
    pub fn move_up(collection: &mut PageCollection, row: usize) -> Result<usize> {
        if row >= collection.len() {
            return Err(PageCatError::index_out_of_range(row, collection.len()));
        }
        if row == 0 {
            return Ok(0);
        }
        collection.move_to(row, row - 1)?;
        Ok(row - 1)
    }

    /// Move the page at `row` one position later. No-op on the last row.
    ///
    /// Returns the page's new row.
    pub fn move_down(collection: &mut PageCollection, row: usize) -> Result<usize> {
        if row >= collection.len() {
            return Err(PageCatError::index_out_of_range(row, collection.len()));
        }
        if row + 1 == collection.len() {
            return Ok(row);
        }
        collection.move_to(row, row + 1)?;
        Ok(row + 1)
    }
}
