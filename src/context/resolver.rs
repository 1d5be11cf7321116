//! Upward directory walk that discovers manifest, style config and toolchain.

use std::path::{Path, PathBuf};

use super::ResolvedContext;
use super::cache::normalize_path;
use super::manifest::{read_edition, read_toolchain};

const LOG_TARGET: &str = "rustfmt_ls::context";

/// Project manifest marking a crate root.
pub const MANIFEST_FILE_NAME: &str = "Cargo.toml";

/// Style config names, in precedence order within one directory.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["rustfmt.toml", ".rustfmt.toml"];

/// Toolchain declaration names, in precedence order within one directory.
pub const TOOLCHAIN_FILE_NAMES: [&str; 2] = ["rust-toolchain.toml", "rust-toolchain"];

/// Files found while walking up from a source file.
///
/// Each slot is filled by the first directory that has a match; the three
/// slots are independent and may come from different depths.
#[derive(Debug, Default)]
struct Discovered {
    manifest: Option<PathBuf>,
    config: Option<PathBuf>,
    toolchain: Option<PathBuf>,
}

impl Discovered {
    fn is_complete(&self) -> bool {
        self.manifest.is_some() && self.config.is_some() && self.toolchain.is_some()
    }
}

/// Resolve the rustfmt context for `file_path`.
///
/// Walks from the file's directory toward the filesystem root, stopping after
/// `boundary` (inclusive) when given. Missing or unreadable files only leave
/// the corresponding fields unset.
///
/// The working directory is the manifest's directory when one was found,
/// otherwise the boundary, otherwise the file's own directory.
pub async fn resolve(file_path: &Path, boundary: Option<&Path>) -> ResolvedContext {
    let file_dir = absolute_parent(file_path);
    let found = walk_upward(&file_dir, boundary).await;

    let working_directory = found
        .manifest
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .or_else(|| boundary.map(Path::to_path_buf))
        .or(Some(file_dir));

    let edition = match &found.manifest {
        Some(manifest) => read_edition(manifest).await,
        None => None,
    };
    let toolchain = match &found.toolchain {
        Some(toolchain_file) => read_toolchain(toolchain_file).await,
        None => None,
    };

    let context = ResolvedContext {
        working_directory,
        config_file_path: found.config,
        edition,
        toolchain,
    };
    log::debug!(
        target: LOG_TARGET,
        "Resolved context for {}: {:?}",
        file_path.display(),
        context
    );
    context
}

fn absolute_parent(file_path: &Path) -> PathBuf {
    let dir = match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::path::absolute(&dir).unwrap_or(dir)
}

async fn walk_upward(start: &Path, boundary: Option<&Path>) -> Discovered {
    let stop = boundary.map(|dir| {
        let dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
        normalize_path(&dir)
    });
    let mut found = Discovered::default();
    let mut current = Some(start);

    while let Some(dir) = current {
        if found.manifest.is_none() {
            found.manifest = first_existing(dir, &[MANIFEST_FILE_NAME]).await;
        }
        if found.config.is_none() {
            found.config = first_existing(dir, &CONFIG_FILE_NAMES).await;
        }
        if found.toolchain.is_none() {
            found.toolchain = first_existing(dir, &TOOLCHAIN_FILE_NAMES).await;
        }

        if found.is_complete() {
            break;
        }
        if stop.as_deref() == Some(normalize_path(dir).as_path()) {
            break;
        }
        current = dir.parent();
    }

    found
}

/// First candidate (in the given order) that exists as a file in `dir`.
async fn first_existing(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    for name in names {
        let candidate = dir.join(name);
        if tokio::fs::metadata(&candidate)
            .await
            .is_ok_and(|meta| meta.is_file())
        {
            return Some(candidate);
        }
    }
    None
}
