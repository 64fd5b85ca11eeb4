//! List projection of a page collection.
//!
//! [`ListView`] is what a front end draws: one row per page, in collection
//! order. It is rebuilt from every [`CollectionEvent`] and has no way to
//! reorder rows on its own. Selection follows the selected page through moves.

use std::cell::RefCell;
use std::rc::Rc;

use crate::collection::{Change, CollectionEvent, PageCollection, SubscriptionId};

/// Rows shown for a page collection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListView {
    rows: Vec<String>,
    selected: Option<usize>,
}

impl ListView {
    /// Subscribe a new view to `collection`.
    ///
    /// The returned view is already in sync with the collection and stays in
    /// sync until the subscription is removed.
    pub fn attach(collection: &mut PageCollection) -> (Rc<RefCell<ListView>>, SubscriptionId) {
        let view = Rc::new(RefCell::new(ListView::default()));
        let sink = Rc::clone(&view);
        let id = collection.subscribe(move |event| sink.borrow_mut().apply(event));
        (view, id)
    }

    /// Row labels in display order.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Currently selected row.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select a row. Out-of-range rows clear the selection.
    pub fn select(&mut self, row: Option<usize>) {
        self.selected = row.filter(|&r| r < self.rows.len());
    }

    /// Status line summarizing the queue.
    pub fn status(&self) -> String {
        format!("{} page(s) queued", self.rows.len())
    }

    fn apply(&mut self, event: &CollectionEvent<'_>) {
        self.rows = event.pages.iter().map(|p| p.label.clone()).collect();

        self.selected = match (event.change, self.selected) {
            (_, None) | (Change::Cleared, _) => None,
            (Change::Appended { .. }, sel) => sel,
            (Change::Removed { index }, Some(sel)) if sel == index => None,
            (Change::Removed { index }, Some(sel)) if sel > index => Some(sel - 1),
            (Change::Removed { .. }, sel) => sel,
            (Change::Moved { from, to }, Some(sel)) if sel == from => Some(to),
            (Change::Moved { from, to }, Some(sel)) if from < sel && sel <= to => Some(sel - 1),
            (Change::Moved { from, to }, Some(sel)) if to <= sel && sel < from => Some(sel + 1),
            (Change::Moved { .. }, sel) => sel,
        };
    }
}
