//! Client notification abstraction for LSP communication.
//!
//! `ClientNotifier` wraps `tower_lsp_server::Client` and centralizes what the
//! server tells the user: log messages, popups for failed formats, and
//! `$/progress` for workspace runs. Capability-dependent calls check the
//! shared `OnceLock` and fall back to no-ops before `initialize()`.

use std::sync::OnceLock;
use tower_lsp_server::Client;
use tower_lsp_server::ls_types::notification::Progress;
use tower_lsp_server::ls_types::request::WorkDoneProgressCreate;
use tower_lsp_server::ls_types::{
    ClientCapabilities, MessageType, NumberOrString, WorkDoneProgressCreateParams,
};

use crate::error::{FormatError, Severity};
use crate::format::{BatchProgress, BatchTally};
use crate::lsp::settings::{SettingsEvent, SettingsEventKind};

use super::progress::{create_progress_begin, create_progress_end, create_progress_report};

const LOG_TARGET: &str = "rustfmt_ls::lsp";

/// Whether the client accepts versioned `documentChanges` in workspace edits.
pub(crate) fn check_document_changes_support(caps: &ClientCapabilities) -> bool {
    caps.workspace
        .as_ref()
        .and_then(|w| w.workspace_edit.as_ref())
        .and_then(|we| we.document_changes)
        .unwrap_or(false)
}

/// Whether the client accepts server-initiated work done progress.
pub(crate) fn check_work_done_progress_support(caps: &ClientCapabilities) -> bool {
    caps.window
        .as_ref()
        .and_then(|w| w.work_done_progress)
        .unwrap_or(false)
}

pub(crate) fn message_type(severity: Severity) -> MessageType {
    match severity {
        Severity::Error => MessageType::ERROR,
        Severity::Warning => MessageType::WARNING,
    }
}

#[derive(Clone)]
pub(crate) struct ClientNotifier<'a> {
    client: Client,
    client_capabilities: &'a OnceLock<ClientCapabilities>,
}

impl std::fmt::Debug for ClientNotifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientNotifier")
            .field("client", &self.client)
            .field("client_capabilities", &"&OnceLock<ClientCapabilities>")
            .finish()
    }
}

impl<'a> ClientNotifier<'a> {
    pub(crate) fn new(
        client: Client,
        client_capabilities: &'a OnceLock<ClientCapabilities>,
    ) -> Self {
        Self {
            client,
            client_capabilities,
        }
    }

    pub(crate) async fn log(&self, level: MessageType, message: impl Into<String>) {
        self.client.log_message(level, message.into()).await;
    }

    pub(crate) async fn log_info(&self, message: impl Into<String>) {
        self.log(MessageType::INFO, message).await;
    }

    /// Show a popup to the user.
    pub(crate) async fn show(&self, level: MessageType, message: impl Into<String>) {
        self.client.show_message(level, message.into()).await;
    }

    /// Surface a failed format: always logged, shown as a popup when the
    /// user can act on it.
    pub(crate) async fn show_format_error(&self, err: &FormatError) {
        let level = message_type(err.severity());
        let message = err.to_string();
        self.log(level, message.clone()).await;
        if err.is_user_facing() {
            self.show(level, message).await;
        }
    }

    pub(crate) async fn log_settings_events(&self, events: &[SettingsEvent]) {
        for event in events {
            let message_type = match event.kind {
                SettingsEventKind::Info => MessageType::INFO,
                SettingsEventKind::Warning => MessageType::WARNING,
            };
            self.client
                .log_message(message_type, event.message.clone())
                .await;
        }
    }

    /// Ask the client to create a progress token.
    ///
    /// Returns false when the client does not support work done progress or
    /// refused the token; progress notifications are skipped in that case.
    pub(crate) async fn create_progress(&self, token: &NumberOrString) -> bool {
        let supported = self
            .client_capabilities
            .get()
            .map(check_work_done_progress_support)
            .unwrap_or(false);
        if !supported {
            return false;
        }
        match self
            .client
            .send_request::<WorkDoneProgressCreate>(WorkDoneProgressCreateParams {
                token: token.clone(),
            })
            .await
        {
            Ok(()) => true,
            Err(err) => {
                log::debug!(target: LOG_TARGET, "workDoneProgress/create failed: {}", err);
                false
            }
        }
    }

    pub(crate) async fn progress_begin(&self, token: &NumberOrString, total: usize) {
        self.client
            .send_notification::<Progress>(create_progress_begin(token.clone(), total))
            .await;
    }

    pub(crate) async fn progress_report(&self, token: &NumberOrString, progress: &BatchProgress) {
        self.client
            .send_notification::<Progress>(create_progress_report(token.clone(), progress))
            .await;
    }

    pub(crate) async fn progress_end(&self, token: &NumberOrString, tally: &BatchTally) {
        self.client
            .send_notification::<Progress>(create_progress_end(token.clone(), tally))
            .await;
    }
}
