use tower_lsp_server::ls_types::TextEdit;

use super::edit::FullDocumentEdit;
use crate::error::FormatError;

/// Result of one format request.
///
/// Only `Replaced` carries an edit; every other variant means "leave the
/// buffer alone", for a different reason.
#[derive(Debug)]
pub enum FormatOutcome {
    /// Formatted text differs from the buffer
    Replaced(FullDocumentEdit),
    /// Formatter output equals the buffer
    Unchanged,
    /// Formatter succeeded but printed nothing
    Empty,
    /// Canceled externally or superseded by a newer request
    Canceled,
    /// The buffer changed while the formatter ran
    Stale,
    Failed(FormatError),
}

impl FormatOutcome {
    /// Edits to hand to the client: zero or one.
    pub fn edits(&self) -> Vec<TextEdit> {
        match self {
            FormatOutcome::Replaced(edit) => vec![edit.to_text_edit()],
            _ => Vec::new(),
        }
    }

    pub fn error(&self) -> Option<&FormatError> {
        match self {
            FormatOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}
