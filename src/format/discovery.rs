//! Workspace file discovery for batch formatting.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "rustfmt_ls::batch";

/// Directory names never descended into.
pub const EXCLUDED_DIRS: [&str; 4] = ["target", ".git", "node_modules", "out"];

const RUST_EXTENSION: &str = "rs";

/// Collect every `*.rs` file under `roots`, sorted and deduplicated.
///
/// A root that is itself a file is included when it has the `.rs` extension.
/// Ignore files (`.gitignore` and friends) are not consulted; only the fixed
/// directory exclusions apply. Unreadable entries are logged and skipped.
pub fn discover_rust_files<P: AsRef<Path>>(roots: &[P]) -> Vec<PathBuf> {
    let Some((first, rest)) = roots.split_first() else {
        return Vec::new();
    };

    let mut walk_builder = WalkBuilder::new(first);
    for root in rest {
        walk_builder.add(root);
    }
    walk_builder
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(|entry| !is_excluded_dir(entry.path(), entry.depth()));

    let mut files: Vec<PathBuf> = walk_builder
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| is_rust_file(path))
        .collect();

    files.sort();
    files.dedup();
    files
}

fn is_excluded_dir(path: &Path, depth: usize) -> bool {
    // Roots are always walked, even when named like an excluded dir.
    depth > 0
        && path.is_dir()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

fn is_rust_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == RUST_EXTENSION)
}
