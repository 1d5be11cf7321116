//! Formatting method for RustfmtLs.

use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::{DocumentFormattingParams, TextEdit};

use crate::format::FormatOutcome;

use super::super::{LOG_TARGET, RustfmtLs, uri_to_url};

impl RustfmtLs {
    pub(crate) async fn formatting_impl(
        &self,
        params: DocumentFormattingParams,
    ) -> Result<Option<Vec<TextEdit>>> {
        let lsp_uri = params.text_document.uri;
        let Ok(uri) = uri_to_url(&lsp_uri) else {
            log::warn!(target: LOG_TARGET, "Invalid URI in formatting: {}", lsp_uri.as_str());
            return Ok(None);
        };

        // Dropping this future on $/cancelRequest cancels the running process.
        let outcome = self
            .formatter
            .format_document(&uri, &self.documents, Some(&self.shutdown), None)
            .await;

        match outcome {
            FormatOutcome::Replaced(edit) => Ok(Some(vec![edit.into_text_edit()])),
            FormatOutcome::Failed(err) => {
                self.notifier().show_format_error(&err).await;
                Ok(None)
            }
            FormatOutcome::Unchanged
            | FormatOutcome::Empty
            | FormatOutcome::Canceled
            | FormatOutcome::Stale => Ok(None),
        }
    }
}
