use crate::document::{Document, DocumentSnapshot};
use dashmap::DashMap;
use url::Url;

// The central store for all open buffers.
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, uri: Url, document: Document) {
        self.documents.insert(uri, document);
    }

    /// Rewrite a document's text in place.
    ///
    /// `apply` receives the current text and returns the new one; the entry
    /// stays locked for the duration so concurrent edits cannot interleave.
    /// Returns false when the document is not open.
    pub fn edit(&self, uri: &Url, version: Option<i32>, apply: impl FnOnce(&str) -> String) -> bool {
        match self.documents.get_mut(uri) {
            Some(mut doc) => {
                let text = apply(doc.text());
                doc.update(text, version);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self, uri: &Url) -> Option<DocumentSnapshot> {
        self.documents.get(uri).map(|doc| doc.snapshot())
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn remove(&self, uri: &Url) -> Option<Document> {
        self.documents.remove(uri).map(|(_, doc)| doc)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
