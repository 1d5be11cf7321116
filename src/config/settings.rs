use serde::{Deserialize, Serialize};

use super::defaults::DEFAULT_TOOL_PATH;

/// One layer of formatter settings as written by the user.
///
/// Every field is optional so that a layer only overrides what it names.
/// Keys are camelCase in both TOML files and LSP JSON payloads:
///
/// ```toml
/// path = "/opt/rust/bin/rustfmt"
/// extraArgs = ["--unstable-features"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatterSettings {
    pub path: Option<String>,
    pub extra_args: Option<Vec<String>>,
}

/// Effective formatter configuration after all layers are merged.
///
/// Held behind an `ArcSwap` by the orchestrator; each invocation reads one
/// snapshot at its start and keeps it until it settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterConfig {
    /// Executable to spawn, resolved through `PATH` when not absolute
    pub tool_path: String,
    /// Arguments appended after the context-derived ones
    pub extra_args: Vec<String>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            tool_path: DEFAULT_TOOL_PATH.to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl From<FormatterSettings> for FormatterConfig {
    fn from(settings: FormatterSettings) -> Self {
        // A blank path means "not configured".
        let tool_path = settings
            .path
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_TOOL_PATH.to_string());

        Self {
            tool_path,
            extra_args: settings.extra_args.unwrap_or_default(),
        }
    }
}
