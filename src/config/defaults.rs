//! Built-in configuration values, the lowest settings layer.

use super::settings::FormatterSettings;

/// Formatter executable looked up through `PATH`.
pub const DEFAULT_TOOL_PATH: &str = "rustfmt";

/// Name of the settings file, both per user and per project.
pub const CONFIG_FILE_NAME: &str = "rustfmt-ls.toml";

/// Returns the default settings layer.
pub fn default_settings() -> FormatterSettings {
    FormatterSettings {
        path: Some(DEFAULT_TOOL_PATH.to_string()),
        extra_args: Some(Vec::new()),
    }
}
