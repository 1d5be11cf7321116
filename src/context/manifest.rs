//! Minimal field extraction from `Cargo.toml` and toolchain files.
//!
//! Neither file is parsed as TOML. A line-oriented match is enough for the two
//! fields needed here and keeps a half-edited manifest from failing a format.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

const LOG_TARGET: &str = "rustfmt_ls::context";

static EDITION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*edition\s*=\s*["'](\d{4})["']\s*(#.*)?$"#)
        .expect("valid regex for edition pattern")
});

static CHANNEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*channel\s*=\s*["']([^"']+)["']\s*(#.*)?$"#)
        .expect("valid regex for channel pattern")
});

/// Extract the `edition = "XXXX"` value from manifest contents.
pub fn parse_edition(contents: &str) -> Option<String> {
    EDITION_PATTERN
        .captures(contents)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the toolchain name from a `rust-toolchain(.toml)` file.
///
/// A `channel = "..."` line wins. Otherwise the first meaningful line is taken
/// as a bare toolchain name (the legacy single-line format) with surrounding
/// quotes trimmed. A TOML table header or key/value line in that position means
/// the file pins no channel.
pub fn parse_toolchain(contents: &str) -> Option<String> {
    if let Some(channel) = CHANNEL_PATTERN.captures(contents).and_then(|caps| caps.get(1)) {
        return Some(channel.as_str().to_string());
    }

    let line = contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))?;

    if line.starts_with('[') || line.contains('=') {
        return None;
    }

    let line = line.strip_prefix(['"', '\'']).unwrap_or(line);
    let line = line.strip_suffix(['"', '\'']).unwrap_or(line);
    (!line.is_empty()).then(|| line.to_string())
}

pub(crate) async fn read_edition(manifest: &Path) -> Option<String> {
    match tokio::fs::read_to_string(manifest).await {
        Ok(contents) => parse_edition(&contents),
        Err(e) => {
            log::debug!(target: LOG_TARGET, "Cannot read {}: {}", manifest.display(), e);
            None
        }
    }
}

pub(crate) async fn read_toolchain(toolchain_file: &Path) -> Option<String> {
    match tokio::fs::read_to_string(toolchain_file).await {
        Ok(contents) => parse_toolchain(&contents),
        Err(e) => {
            log::debug!(target: LOG_TARGET, "Cannot read {}: {}", toolchain_file.display(), e);
            None
        }
    }
}
