use url::Url;

use crate::document::{DocumentSnapshot, DocumentStore};

/// Somewhere the current text of a document can be read from.
///
/// The orchestrator reads a source twice: once before running the formatter
/// and once after, to detect edits made in the meantime.
pub trait TextSource {
    fn snapshot(&self, uri: &Url) -> Option<DocumentSnapshot>;
}

impl TextSource for DocumentStore {
    fn snapshot(&self, uri: &Url) -> Option<DocumentSnapshot> {
        DocumentStore::snapshot(self, uri)
    }
}

/// A fixed text, e.g. a file loaded from disk for one batch step.
impl TextSource for DocumentSnapshot {
    fn snapshot(&self, _uri: &Url) -> Option<DocumentSnapshot> {
        Some(self.clone())
    }
}
