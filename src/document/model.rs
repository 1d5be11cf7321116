/// An open editor buffer as last reported by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    version: Option<i32>,
}

impl Document {
    /// Create a document as announced by `didOpen`
    pub fn opened(text: String, version: i32) -> Self {
        Self {
            text,
            version: Some(version),
        }
    }

    /// Get the text content
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace text, and the version when one is given.
    pub fn update(&mut self, text: String, version: Option<i32>) {
        self.text = text;
        if version.is_some() {
            self.version = version;
        }
    }

    /// Text and version frozen at this instant.
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            text: self.text.clone(),
            version: self.version,
        }
    }
}

/// Immutable copy of a buffer's text and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub text: String,
    pub version: Option<i32>,
}

impl DocumentSnapshot {
    /// Snapshot of text that has no editor version (e.g. read from disk).
    pub fn unversioned(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            version: None,
        }
    }
}
