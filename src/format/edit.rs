use tower_lsp_server::ls_types::{Range, TextEdit};

use crate::document::DocumentSnapshot;
use crate::text::PositionMapper;

/// Replacement of an entire buffer with formatted text.
///
/// The range spans the snapshot the formatter ran on, from `(0, 0)` to the
/// position just past its last character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullDocumentEdit {
    pub range: Range,
    pub new_text: String,
    /// Buffer version the snapshot was taken from
    pub version: Option<i32>,
}

impl FullDocumentEdit {
    pub fn new(snapshot: &DocumentSnapshot, new_text: String) -> Self {
        Self {
            range: PositionMapper::new(&snapshot.text).full_range(),
            new_text,
            version: snapshot.version,
        }
    }

    pub fn to_text_edit(&self) -> TextEdit {
        TextEdit {
            range: self.range,
            new_text: self.new_text.clone(),
        }
    }

    pub fn into_text_edit(self) -> TextEdit {
        TextEdit {
            range: self.range,
            new_text: self.new_text,
        }
    }
}
