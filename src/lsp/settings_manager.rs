//! Settings management for the LSP server.
//!
//! `SettingsManager` keeps the state set during `initialize()`: client
//! capabilities, the workspace root used for the project config layer, and
//! the initialization options that later configuration changes fall back to.

use arc_swap::ArcSwap;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tower_lsp_server::ls_types::ClientCapabilities;

use crate::lsp::client::check_document_changes_support;

pub(crate) struct SettingsManager {
    root_path: ArcSwap<Option<PathBuf>>,
    initialization_options: ArcSwap<Option<Value>>,
    /// Client capabilities from initialize() - immutable after initialization.
    client_capabilities: OnceLock<ClientCapabilities>,
}

impl std::fmt::Debug for SettingsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsManager")
            .field("root_path", &self.root_path.load_full())
            .field("client_capabilities", &"OnceLock<ClientCapabilities>")
            .finish()
    }
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsManager {
    pub(crate) fn new() -> Self {
        Self {
            root_path: ArcSwap::new(Arc::new(None)),
            initialization_options: ArcSwap::new(Arc::new(None)),
            client_capabilities: OnceLock::new(),
        }
    }

    /// Store client capabilities from initialize().
    ///
    /// Subsequent calls are ignored (OnceLock semantics).
    pub(crate) fn set_capabilities(&self, caps: ClientCapabilities) {
        // initialize() is called exactly once per session.
        let _ = self.client_capabilities.set(caps);
    }

    pub(crate) fn client_capabilities_lock(&self) -> &OnceLock<ClientCapabilities> {
        &self.client_capabilities
    }

    pub(crate) fn set_root_path(&self, path: Option<PathBuf>) {
        self.root_path.store(Arc::new(path));
    }

    pub(crate) fn root_path(&self) -> Arc<Option<PathBuf>> {
        self.root_path.load_full()
    }

    pub(crate) fn set_initialization_options(&self, options: Option<Value>) {
        self.initialization_options.store(Arc::new(options));
    }

    pub(crate) fn initialization_options(&self) -> Option<Value> {
        Option::clone(&self.initialization_options.load_full())
    }

    /// Returns true if client declared workspace.workspaceEdit.documentChanges.
    /// Returns false if initialize() hasn't been called yet.
    pub(crate) fn supports_document_changes(&self) -> bool {
        self.client_capabilities
            .get()
            .map(check_document_changes_support)
            .unwrap_or(false)
    }
}
