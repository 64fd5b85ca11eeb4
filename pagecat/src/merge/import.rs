//! Copying pages between lopdf documents.
//!
//! A page is copied together with every object it reaches (content streams,
//! fonts, images, annotations) under fresh object ids in the target document.
//! Objects already copied from the same source are reused, so adding a page
//! twice, or several pages sharing a font, does not duplicate resources. The
//! page dictionary itself is always new: each occurrence in the output is its
//! own page object. Annotations belong to exactly one page, so they are copied
//! again for every occurrence.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{PageCatError, Result};
use crate::source::PdfSource;

/// Attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic Parent chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// US Letter, used when neither the page nor its ancestors give a MediaBox.
fn default_media_box() -> Object {
    Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()])
}

/// Imports pages from source documents into one target document.
#[derive(Debug, Default)]
pub struct ObjectImporter {
    /// Source object id to target object id, per source.
    copied: HashMap<PathBuf, HashMap<ObjectId, ObjectId>>,
    /// Page object ids in page order, per source.
    page_ids: HashMap<PathBuf, Vec<ObjectId>>,
}

impl ObjectImporter {
    /// Create an importer with no copied objects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-page objects copied so far.
    pub fn copied_objects(&self) -> usize {
        self.copied.values().map(HashMap::len).sum()
    }

    /// Copy page `page_index` (zero-based) of `source` into `target`, as a
    /// child of the page tree node `parent`.
    ///
    /// Returns the id of the new page object. The caller must add it to the
    /// parent's Kids array.
    ///
    /// # Errors
    ///
    /// Returns an error if `page_index` is out of range or the page object
    /// is not a dictionary.
    pub fn import_page(
        &mut self,
        target: &mut Document,
        source: &PdfSource,
        page_index: usize,
        parent: ObjectId,
    ) -> Result<ObjectId> {
        let page_ids = self
            .page_ids
            .entry(source.path.clone())
            .or_insert_with(|| source.document.get_pages().into_values().collect());

        let page_id = *page_ids.get(page_index).ok_or_else(|| {
            PageCatError::other(format!(
                "page {} not found in {}",
                page_index + 1,
                source.path.display()
            ))
        })?;

        let mut page = source.document.get_dictionary(page_id)?.clone();
        for key in INHERITABLE {
            if !page.has(key)
                && let Some(value) = inherited(&source.document, &page, key)
            {
                page.set(key.to_vec(), value);
            }
        }
        page.remove(b"Parent");
        if !page.has(b"MediaBox") {
            page.set("MediaBox", default_media_box());
        }

        let new_page_id = target.new_object_id();
        let mut copier = Copier {
            source: &source.document,
            target: &mut *target,
            map: self.copied.entry(source.path.clone()).or_default(),
            annots: annotation_ids(&source.document, &page),
            own: HashMap::new(),
            page: (page_id, new_page_id),
            pending: Vec::new(),
        };

        let mut copied = copier.rewrite_dict(&page);
        copier.drain();

        copied.set("Parent", parent);
        target.objects.insert(new_page_id, Object::Dictionary(copied));
        Ok(new_page_id)
    }
}

/// Look up `key` on the ancestors of `page`.
fn inherited(source: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut current = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let node = source.get_dictionary(current?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        current = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// The Annots array of `page` and the annotations it lists, if indirect.
fn annotation_ids(source: &Document, page: &Dictionary) -> HashSet<ObjectId> {
    let mut ids = HashSet::new();
    let Ok(annots) = page.get(b"Annots") else {
        return ids;
    };
    let array = match annots {
        Object::Reference(id) => {
            ids.insert(*id);
            source.get_object(*id).and_then(Object::as_array)
        }
        other => other.as_array(),
    };
    if let Ok(items) = array {
        ids.extend(items.iter().filter_map(|item| item.as_reference().ok()));
    }
    ids
}

fn is_page_tree_node(obj: &Object) -> bool {
    obj.as_dict()
        .and_then(|d| d.get(b"Type"))
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"Page" || name == b"Pages")
}

struct Copier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    /// Shared with every other page copied from this source.
    map: &'a mut HashMap<ObjectId, ObjectId>,
    /// Source ids of this page's annotations; copied through `own`.
    annots: HashSet<ObjectId>,
    own: HashMap<ObjectId, ObjectId>,
    /// (source page id, new page id) of the page being copied.
    page: (ObjectId, ObjectId),
    /// (source id, target id) still to be copied.
    pending: Vec<(ObjectId, ObjectId)>,
}

impl Copier<'_> {
    /// Rewrite a reference into the target's id space, scheduling the
    /// referenced object for copying on first sight.
    ///
    /// References to other pages or page tree nodes would drag the whole
    /// source tree along and are replaced with null, as are dangling ones.
    fn map_ref(&mut self, id: ObjectId) -> Object {
        if id == self.page.0 {
            return Object::Reference(self.page.1);
        }
        let map = if self.annots.contains(&id) {
            &mut self.own
        } else {
            &mut *self.map
        };
        if let Some(&new) = map.get(&id) {
            return Object::Reference(new);
        }

        match self.source.get_object(id) {
            Ok(obj) if !is_page_tree_node(obj) => {
                let new = self.target.new_object_id();
                map.insert(id, new);
                self.pending.push((id, new));
                Object::Reference(new)
            }
            _ => Object::Null,
        }
    }

    fn rewrite(&mut self, obj: &Object) -> Object {
        match obj {
            Object::Reference(id) => self.map_ref(*id),
            Object::Array(items) => Object::Array(items.iter().map(|o| self.rewrite(o)).collect()),
            Object::Dictionary(dict) => Object::Dictionary(self.rewrite_dict(dict)),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.rewrite_dict(&stream.dict);
                Object::Stream(copy)
            }
            other => other.clone(),
        }
    }

    fn rewrite_dict(&mut self, dict: &Dictionary) -> Dictionary {
        let mut out = Dictionary::new();
        for (key, value) in dict.iter() {
            out.set(key.clone(), self.rewrite(value));
        }
        out
    }

    /// Copy every scheduled object. Copying may schedule more.
    fn drain(&mut self) {
        let source = self.source;
        while let Some((src, new)) = self.pending.pop() {
            let Ok(obj) = source.get_object(src) else {
                continue;
            };
            let copied = self.rewrite(obj);
            self.target.objects.insert(new, copied);
        }
    }
}
