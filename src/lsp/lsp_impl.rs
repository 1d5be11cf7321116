use dashmap::DashMap;
use serde_json::Value;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::*;
use tower_lsp_server::{Client, LanguageServer};
use url::Url;

use crate::document::{Document, DocumentStore};
use crate::format::Formatter;
use crate::lsp::client::ClientNotifier;
use crate::lsp::progress::is_workspace_token;
use crate::lsp::settings::{SettingsSource, load_settings};
use crate::lsp::settings_manager::SettingsManager;
use crate::lsp::text_sync::apply_content_changes;
use crate::lsp::{FORMAT_COMMAND, FORMAT_WORKSPACE_COMMAND};

mod text_document;
mod workspace;

const LOG_TARGET: &str = "rustfmt_ls::lsp";

pub(crate) fn uri_to_url(uri: &Uri) -> std::result::Result<Url, url::ParseError> {
    Url::parse(uri.as_str())
}

pub(crate) fn url_to_uri(url: &Url) -> std::result::Result<Uri, String> {
    url.as_str().parse::<Uri>().map_err(|e| e.to_string())
}

/// Local directory of a workspace folder URI.
fn folder_path(uri: &Uri) -> Option<PathBuf> {
    uri_to_url(uri).ok()?.to_file_path().ok()
}

pub struct RustfmtLs {
    client: Client,
    documents: DocumentStore,
    formatter: Formatter,
    settings: SettingsManager,
    /// Cancellation of running workspace formats, keyed by progress token
    workspace_runs: DashMap<String, CancellationToken>,
    /// Fired on shutdown; parent of every format this server starts
    shutdown: CancellationToken,
}

impl std::fmt::Debug for RustfmtLs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustfmtLs")
            .field("client", &self.client)
            .field("documents", &self.documents.len())
            .field("formatter", &self.formatter)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl RustfmtLs {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            formatter: Formatter::default(),
            settings: SettingsManager::new(),
            workspace_runs: DashMap::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// `window/workDoneProgress/cancel`, registered as a custom method.
    pub async fn work_done_progress_cancel(&self, params: WorkDoneProgressCancelParams) {
        if !is_workspace_token(&params.token) {
            return;
        }
        if let NumberOrString::String(token) = &params.token
            && let Some(run) = self.workspace_runs.get(token)
        {
            log::info!(target: LOG_TARGET, "Canceling workspace format {}", token);
            run.value().cancel();
        }
    }

    fn notifier(&self) -> ClientNotifier<'_> {
        ClientNotifier::new(self.client.clone(), self.settings.client_capabilities_lock())
    }

    /// Re-layer every settings source and install the result.
    async fn reload_settings(&self, override_settings: Option<(SettingsSource, Value)>) {
        let root = self.settings.root_path();
        let outcome = load_settings(root.as_deref(), override_settings);
        self.formatter.update_config(outcome.config);
        self.notifier().log_settings_events(&outcome.events).await;
    }
}

impl LanguageServer for RustfmtLs {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let folders: Vec<PathBuf> = params
            .workspace_folders
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|folder| folder_path(&folder.uri))
            .collect();

        #[allow(deprecated)]
        let root_path = folders
            .first()
            .cloned()
            .or_else(|| params.root_uri.as_ref().and_then(folder_path));

        let folders = if folders.is_empty() {
            root_path.iter().cloned().collect()
        } else {
            folders
        };
        log::info!(target: LOG_TARGET, "Workspace folders: {:?}", folders);
        self.formatter.set_workspace_folders(folders);

        self.settings.set_root_path(root_path);
        self.settings.set_capabilities(params.capabilities);
        self.settings
            .set_initialization_options(params.initialization_options.clone());
        self.reload_settings(
            params
                .initialization_options
                .map(|options| (SettingsSource::InitializationOptions, options)),
        )
        .await;

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                document_formatting_provider: Some(OneOf::Left(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![
                        FORMAT_COMMAND.to_string(),
                        FORMAT_WORKSPACE_COMMAND.to_string(),
                    ],
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..ServerCapabilities::default()
            },
            ..InitializeResult::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.notifier().log_info("rustfmt-ls initialized").await;
    }

    async fn shutdown(&self) -> Result<()> {
        for run in self.workspace_runs.iter() {
            run.value().cancel();
        }
        self.shutdown.cancel();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let lsp_uri = params.text_document.uri;
        let Ok(uri) = uri_to_url(&lsp_uri) else {
            log::warn!(target: LOG_TARGET, "Invalid URI in didOpen: {}", lsp_uri.as_str());
            return;
        };
        self.documents.insert(
            uri,
            Document::opened(params.text_document.text, params.text_document.version),
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let lsp_uri = params.text_document.uri;
        let Ok(uri) = uri_to_url(&lsp_uri) else {
            log::warn!(target: LOG_TARGET, "Invalid URI in didChange: {}", lsp_uri.as_str());
            return;
        };
        let changes = params.content_changes;
        let edited = self
            .documents
            .edit(&uri, Some(params.text_document.version), |text| {
                apply_content_changes(text, changes)
            });
        if !edited {
            log::warn!(target: LOG_TARGET, "didChange for unopened document {}", uri);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let lsp_uri = params.text_document.uri;
        let Ok(uri) = uri_to_url(&lsp_uri) else {
            log::warn!(target: LOG_TARGET, "Invalid URI in didClose: {}", lsp_uri.as_str());
            return;
        };
        self.formatter.cancel(&uri);
        self.documents.remove(&uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let override_settings = if params.settings.is_null() {
            self.settings
                .initialization_options()
                .map(|options| (SettingsSource::InitializationOptions, options))
        } else {
            Some((SettingsSource::ClientConfiguration, params.settings))
        };
        self.reload_settings(override_settings).await;
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        let removed: Vec<PathBuf> = params
            .event
            .removed
            .iter()
            .filter_map(|folder| folder_path(&folder.uri))
            .collect();
        let mut folders: Vec<PathBuf> = self
            .formatter
            .workspace_folders()
            .iter()
            .filter(|folder| !removed.contains(folder))
            .cloned()
            .collect();
        for added in params.event.added.iter().filter_map(|f| folder_path(&f.uri)) {
            if !folders.contains(&added) {
                folders.push(added);
            }
        }
        log::info!(target: LOG_TARGET, "Workspace folders: {:?}", folders);
        self.formatter.set_workspace_folders(folders);
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        self.formatting_impl(params).await
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<LSPAny>> {
        self.execute_command_impl(params).await
    }
}
