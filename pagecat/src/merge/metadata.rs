//! Document Info dictionary.
//!
//! Only the fields the user supplied are written, plus Creator and Producer.
//! No dates are recorded, so exporting the same pages twice produces the same
//! document content.

use lopdf::{Dictionary, Document, Object, decode_text_string, text_string};

use crate::config::Metadata;

const PRODUCER: &str = "pagecat";

/// Reads and writes the Info dictionary.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Write `metadata` into a fresh Info dictionary on `doc`.
    ///
    /// Does nothing when `metadata` is empty.
    pub fn set_metadata(&self, doc: &mut Document, metadata: &Metadata) {
        if metadata.is_empty() {
            return;
        }

        let mut info = Dictionary::new();
        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text_string(value));
            }
        }
        info.set("Creator", text_string(PRODUCER));
        info.set("Producer", text_string(PRODUCER));

        let info_id = doc.add_object(info);
        doc.trailer.set("Info", Object::Reference(info_id));
    }

    /// Read the Info dictionary of `doc`.
    pub fn get_metadata(&self, doc: &Document) -> Metadata {
        let Ok(info) = doc
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
        else {
            return Metadata::default();
        };

        let field = |key: &[u8]| info.get(key).and_then(decode_text_string).ok();

        Metadata::new(
            field(b"Title"),
            field(b"Author"),
            field(b"Subject"),
            field(b"Keywords"),
        )
    }

    /// Check if a document has an Info dictionary.
    pub fn has_metadata(&self, doc: &Document) -> bool {
        doc.trailer.has(b"Info")
    }
}
