//! Workspace commands for RustfmtLs.
//!
//! `rustfmt-ls.format` formats one document and applies the result through
//! `workspace/applyEdit`. `rustfmt-ls.formatWorkspace` runs a batch over
//! every workspace folder, reporting cancellable `$/progress`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tower_lsp_server::jsonrpc::{Error, Result};
use tower_lsp_server::ls_types::{
    DocumentChanges, ExecuteCommandParams, LSPAny, MessageType, NumberOrString, OneOf,
    OptionalVersionedTextDocumentIdentifier, TextDocumentEdit, WorkspaceEdit,
};
use url::Url;

use crate::document::DocumentSnapshot;
use crate::error::{FormatError, FormatResult};
use crate::format::{
    BatchProgress, BatchRunner, BatchTally, FormatOutcome, FullDocumentEdit, WorkspaceHost,
    discover_rust_files,
};
use crate::lsp::client::ClientNotifier;
use crate::lsp::progress::progress_token;
use crate::lsp::{FORMAT_COMMAND, FORMAT_WORKSPACE_COMMAND};

use super::{LOG_TARGET, RustfmtLs, url_to_uri};

static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);

impl RustfmtLs {
    pub(crate) async fn execute_command_impl(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<LSPAny>> {
        match params.command.as_str() {
            FORMAT_COMMAND => {
                let Some(uri) = params
                    .arguments
                    .first()
                    .and_then(|arg| arg.as_str())
                    .and_then(|s| Url::parse(s).ok())
                else {
                    return Err(Error::invalid_params(format!(
                        "{} expects a document URI argument",
                        FORMAT_COMMAND
                    )));
                };
                let applied = self.format_command(&uri).await;
                Ok(Some(LSPAny::Bool(applied)))
            }
            FORMAT_WORKSPACE_COMMAND => {
                let tally = self.format_workspace().await;
                Ok(tally.and_then(|tally| serde_json::to_value(tally).ok()))
            }
            other => Err(Error::invalid_params(format!("Unknown command: {}", other))),
        }
    }

    /// Format one document and apply the edit. Returns whether anything changed.
    async fn format_command(&self, uri: &Url) -> bool {
        let outcome = if self.documents.contains(uri) {
            self.formatter
                .format_document(uri, &self.documents, Some(&self.shutdown), None)
                .await
        } else {
            match self.load_from_disk(uri).await {
                Ok(snapshot) => {
                    self.formatter
                        .format_document(uri, &snapshot, Some(&self.shutdown), None)
                        .await
                }
                Err(err) => FormatOutcome::Failed(err),
            }
        };

        match outcome {
            FormatOutcome::Replaced(edit) => match self.apply_full_edit(uri, edit).await {
                Ok(applied) => applied,
                Err(err) => {
                    self.notifier().show_format_error(&err).await;
                    false
                }
            },
            FormatOutcome::Failed(err) => {
                self.notifier().show_format_error(&err).await;
                false
            }
            _ => false,
        }
    }

    async fn load_from_disk(&self, uri: &Url) -> FormatResult<DocumentSnapshot> {
        let path = uri
            .to_file_path()
            .map_err(|()| FormatError::invalid_uri(uri.as_str()))?;
        tokio::fs::read_to_string(&path)
            .await
            .map(DocumentSnapshot::unversioned)
            .map_err(|e| FormatError::io(path, e))
    }

    /// Send a full-document replacement to the client.
    ///
    /// Uses a versioned `TextDocumentEdit` when the client supports
    /// `documentChanges`, so an edit computed against an outdated buffer is
    /// rejected by the client.
    async fn apply_full_edit(&self, uri: &Url, edit: FullDocumentEdit) -> FormatResult<bool> {
        let lsp_uri = url_to_uri(uri).map_err(|_| FormatError::invalid_uri(uri.as_str()))?;
        let workspace_edit = if self.settings.supports_document_changes() {
            WorkspaceEdit {
                document_changes: Some(DocumentChanges::Edits(vec![TextDocumentEdit {
                    text_document: OptionalVersionedTextDocumentIdentifier {
                        uri: lsp_uri,
                        version: edit.version,
                    },
                    edits: vec![OneOf::Left(edit.into_text_edit())],
                }])),
                ..WorkspaceEdit::default()
            }
        } else {
            WorkspaceEdit {
                changes: Some(HashMap::from([(lsp_uri, vec![edit.into_text_edit()])])),
                ..WorkspaceEdit::default()
            }
        };

        match self.client.apply_edit(workspace_edit).await {
            Ok(response) => {
                if !response.applied {
                    log::debug!(
                        target: LOG_TARGET,
                        "Client declined edit for {}: {}",
                        uri,
                        response.failure_reason.as_deref().unwrap_or("no reason given")
                    );
                }
                Ok(response.applied)
            }
            Err(err) => {
                log::warn!(target: LOG_TARGET, "workspace/applyEdit failed for {}: {}", uri, err);
                Ok(false)
            }
        }
    }

    /// Format every Rust file under the workspace folders.
    ///
    /// Returns `None` when there was nothing to format.
    async fn format_workspace(&self) -> Option<BatchTally> {
        let notifier = self.notifier();
        let folders = self.formatter.workspace_folders();
        if folders.is_empty() {
            notifier
                .show(MessageType::WARNING, "No workspace folder open")
                .await;
            return None;
        }

        let files = discover_rust_files(folders.as_slice());
        if files.is_empty() {
            notifier
                .show(MessageType::INFO, "No Rust files found in workspace")
                .await;
            return None;
        }

        let token = progress_token(NEXT_RUN_ID.fetch_add(1, Ordering::SeqCst));
        let key = match &token {
            NumberOrString::String(s) => s.clone(),
            NumberOrString::Number(n) => n.to_string(),
        };
        let cancel = CancellationToken::new();
        self.workspace_runs.insert(key.clone(), cancel.clone());

        let progress = if notifier.create_progress(&token).await {
            notifier.progress_begin(&token, files.len()).await;
            Some(token)
        } else {
            None
        };

        let host = LspHost {
            server: self,
            notifier: notifier.clone(),
            progress: progress.clone(),
        };
        let tally = BatchRunner::new(&self.formatter)
            .with_abort(&self.shutdown)
            .run(&files, &host, &cancel)
            .await;
        self.workspace_runs.remove(&key);

        if let Some(token) = &progress {
            notifier.progress_end(token, &tally).await;
        }
        let level = if tally.failed > 0 {
            MessageType::WARNING
        } else {
            MessageType::INFO
        };
        notifier.show(level, tally.summary()).await;
        Some(tally)
    }
}

/// Batch host that reads open buffers and edits through the client.
struct LspHost<'a> {
    server: &'a RustfmtLs,
    notifier: ClientNotifier<'a>,
    progress: Option<NumberOrString>,
}

impl WorkspaceHost for LspHost<'_> {
    async fn load(&self, path: &Path) -> FormatResult<DocumentSnapshot> {
        let uri = Url::from_file_path(path)
            .map_err(|()| FormatError::invalid_uri(path.to_string_lossy()))?;
        match self.server.documents.snapshot(&uri) {
            Some(snapshot) => Ok(snapshot),
            None => self.server.load_from_disk(&uri).await,
        }
    }

    async fn apply(&self, path: &Path, edit: FullDocumentEdit) -> FormatResult<bool> {
        let uri = Url::from_file_path(path)
            .map_err(|()| FormatError::invalid_uri(path.to_string_lossy()))?;
        self.server.apply_full_edit(&uri, edit).await
    }

    async fn report(&self, progress: &BatchProgress) {
        match &self.progress {
            Some(token) => self.notifier.progress_report(token, progress).await,
            None => log::debug!(target: LOG_TARGET, "{}", progress.message()),
        }
    }
}
