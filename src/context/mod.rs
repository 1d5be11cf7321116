//! Per-file rustfmt context discovery.
//!
//! A [`ResolvedContext`] captures everything rustfmt needs to know about where a
//! source file lives: the crate root to run in, the nearest style config, the
//! edition declared by the manifest and any pinned toolchain. It is derived by
//! walking upward from the file (see [`resolve`]) and may be shared across
//! files of the same directory through a [`ContextCache`].

mod cache;
mod manifest;
mod resolver;

pub use cache::{ContextCache, normalize_path};
pub use manifest::{parse_edition, parse_toolchain};
pub use resolver::{CONFIG_FILE_NAMES, MANIFEST_FILE_NAME, TOOLCHAIN_FILE_NAMES, resolve};

use serde::Serialize;
use std::path::PathBuf;

/// Formatting context of a single source file.
///
/// Immutable once built. Every field is optional: a file outside any crate
/// simply has no manifest, no edition and runs in its own directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedContext {
    /// Directory rustfmt is spawned in
    pub working_directory: Option<PathBuf>,
    /// Nearest `rustfmt.toml` / `.rustfmt.toml`
    pub config_file_path: Option<PathBuf>,
    /// `edition` declared by the nearest `Cargo.toml`
    pub edition: Option<String>,
    /// Toolchain pinned by the nearest `rust-toolchain(.toml)`
    pub toolchain: Option<String>,
}
