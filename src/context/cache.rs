//! Per-directory context cache for batch runs.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::ResolvedContext;
use super::resolver::resolve;

/// Normalize a path for use as a comparison or cache key.
///
/// The path is cleaned lexically (`.`/`..` folded, duplicate separators
/// removed). On platforms whose default filesystems are case-insensitive the
/// result is also lowercased, so `C:\Src` and `c:\src` compare equal.
pub fn normalize_path(path: &Path) -> PathBuf {
    let cleaned = path_clean::clean(path);
    if cfg!(any(windows, target_os = "macos")) {
        PathBuf::from(cleaned.to_string_lossy().to_lowercase())
    } else {
        cleaned
    }
}

/// Resolved contexts keyed by normalized containing directory.
///
/// Lives for exactly one batch run: files in the same directory always resolve
/// to the same context, so only the first file of each directory walks the
/// filesystem.
#[derive(Debug, Default)]
pub struct ContextCache {
    entries: DashMap<PathBuf, Arc<ResolvedContext>>,
    hits: AtomicUsize,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached context for the file's directory, resolving on miss.
    pub async fn get_or_resolve(
        &self,
        file_path: &Path,
        boundary: Option<&Path>,
    ) -> Arc<ResolvedContext> {
        let key = Self::key_for(file_path);
        if let Some(context) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(&context);
        }

        let context = Arc::new(resolve(file_path, boundary).await);
        // Sequential batches never race here; if they did, both values are equal.
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| Arc::clone(&context));
        Arc::clone(&entry)
    }

    /// Number of lookups answered without walking the filesystem.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key_for(file_path: &Path) -> PathBuf {
        let dir = file_path.parent().unwrap_or(file_path);
        let dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
        normalize_path(&dir)
    }
}
