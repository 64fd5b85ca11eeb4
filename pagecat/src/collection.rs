//! The ordered page collection.
//!
//! [`PageCollection`] is the single authority on output order. Views never
//! keep an independently mutable copy of it: they subscribe and re-render
//! from the [`CollectionEvent`] each mutation publishes.
//!
//! # Examples
//!
//! ```
//! use pagecat::collection::PageCollection;
//! use pagecat::page::PageRef;
//!
//! let mut pages = PageCollection::new();
//! pages.append(PageRef::pdf("a.pdf", 0));
//! pages.append(PageRef::image("b.png"));
//! pages.move_to(1, 0).unwrap();
//! assert_eq!(pages.get(0).unwrap().label, "[IMG] b.png");
//! ```

use crate::error::{PageCatError, Result};
use crate::page::PageRef;

/// What a mutation did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A page was appended at `index`.
    Appended {
        /// Position of the new page.
        index: usize,
    },
    /// The page at `index` was removed.
    Removed {
        /// Former position of the removed page.
        index: usize,
    },
    /// The page at `from` now sits at `to`.
    Moved {
        /// Former position.
        from: usize,
        /// New position.
        to: usize,
    },
    /// Every page was removed.
    Cleared,
}

/// Notification delivered to subscribers after every mutation.
#[derive(Debug)]
pub struct CollectionEvent<'a> {
    /// The mutation that happened.
    pub change: Change,
    /// The full sequence after the mutation.
    pub pages: &'a [PageRef],
}

/// Handle returned by [`PageCollection::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&CollectionEvent<'_>)>;

/// Ordered sequence of page references.
#[derive(Default)]
pub struct PageCollection {
    pages: Vec<PageRef>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl PageCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&PageRef> {
        self.pages.get(index)
    }

    /// Read-only view of the current order.
    pub fn pages(&self) -> &[PageRef] {
        &self.pages
    }

    /// Copy of the current order, for export or preview.
    pub fn snapshot(&self) -> Vec<PageRef> {
        self.pages.clone()
    }

    /// Register a subscriber. It is called once immediately with a
    /// [`Change::Cleared`] event carrying the current sequence, so a new view
    /// starts in sync, then after every mutation.
    pub fn subscribe<F>(&mut self, mut subscriber: F) -> SubscriptionId
    where
        F: FnMut(&CollectionEvent<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        subscriber(&CollectionEvent {
            change: Change::Cleared,
            pages: &self.pages,
        });
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Insert a page at the end.
    pub fn append(&mut self, page: PageRef) {
        self.pages.push(page);
        self.notify(Change::Appended {
            index: self.pages.len() - 1,
        });
    }

    /// Remove and return the page at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::IndexOutOfRange`] if `index >= len`; the
    /// collection is left unchanged.
    pub fn remove_at(&mut self, index: usize) -> Result<PageRef> {
        self.check_index(index)?;
        let removed = self.pages.remove(index);
        self.notify(Change::Removed { index });
        Ok(removed)
    }

    /// Remove several pages at once.
    ///
    /// All indices are validated before anything is removed. Duplicates are
    /// ignored. Removal runs from the highest index down so the remaining
    /// indices stay valid, and one [`Change::Removed`] is published per page.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::IndexOutOfRange`] for the first invalid index;
    /// nothing is removed in that case.
    pub fn remove_many(&mut self, indices: &[usize]) -> Result<Vec<PageRef>> {
        for &index in indices {
            self.check_index(index)?;
        }

        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut removed = Vec::with_capacity(sorted.len());
        for &index in sorted.iter().rev() {
            removed.push(self.pages.remove(index));
            self.notify(Change::Removed { index });
        }
        removed.reverse();
        Ok(removed)
    }

    /// Move the page at `from` so that it ends up at position `to`.
    ///
    /// All other pages keep their relative order. `from == to` is a no-op and
    /// publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::IndexOutOfRange`] if either index is invalid;
    /// the collection is left unchanged.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;

        if from == to {
            return Ok(());
        }

        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        self.notify(Change::Moved { from, to });
        Ok(())
    }

    /// Remove every page.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.notify(Change::Cleared);
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.pages.len() {
            Ok(())
        } else {
            Err(PageCatError::index_out_of_range(index, self.pages.len()))
        }
    }

    fn notify(&mut self, change: Change) {
        let event = CollectionEvent {
            change,
            pages: &self.pages,
        };
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&event);
        }
    }
}

impl std::fmt::Debug for PageCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCollection")
            .field("pages", &self.pages)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
