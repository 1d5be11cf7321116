mod client;
mod lsp_impl;
mod progress;
mod settings;
mod settings_manager;
mod text_sync;

pub use lsp_impl::RustfmtLs;
pub use settings::{
    SETTINGS_SECTION, SettingsEvent, SettingsEventKind, SettingsLoadOutcome, SettingsSource,
    load_settings,
};

/// Format one document; argument is its URI.
pub const FORMAT_COMMAND: &str = "rustfmt-ls.format";
/// Format every Rust file in the workspace folders.
pub const FORMAT_WORKSPACE_COMMAND: &str = "rustfmt-ls.formatWorkspace";
