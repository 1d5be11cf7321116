use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::batch::{BatchProgress, WorkspaceHost};
use super::edit::FullDocumentEdit;
use crate::document::DocumentSnapshot;
use crate::error::{FormatError, FormatResult};

const LOG_TARGET: &str = "rustfmt_ls::batch";

/// Batch host backed by the filesystem.
///
/// In check mode nothing is written; files that would change are recorded
/// and can be listed afterwards.
#[derive(Debug, Default)]
pub struct DiskHost {
    check: bool,
    needs_formatting: Mutex<Vec<PathBuf>>,
}

impl DiskHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_only() -> Self {
        Self {
            check: true,
            ..Self::default()
        }
    }

    /// Files that differ from rustfmt's output (check mode).
    pub fn needs_formatting(&self) -> Vec<PathBuf> {
        match self.needs_formatting.lock() {
            Ok(files) => files.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, path: &Path) {
        let mut files = match self.needs_formatting.lock() {
            Ok(files) => files,
            Err(poisoned) => poisoned.into_inner(),
        };
        files.push(path.to_path_buf());
    }
}

impl WorkspaceHost for DiskHost {
    async fn load(&self, path: &Path) -> FormatResult<DocumentSnapshot> {
        tokio::fs::read_to_string(path)
            .await
            .map(DocumentSnapshot::unversioned)
            .map_err(|e| FormatError::io(path, e))
    }

    async fn apply(&self, path: &Path, edit: FullDocumentEdit) -> FormatResult<bool> {
        if self.check {
            log::info!(target: LOG_TARGET, "Would reformat {}", path.display());
            self.record(path);
            return Ok(true);
        }
        tokio::fs::write(path, edit.new_text)
            .await
            .map_err(|e| FormatError::io(path, e))?;
        log::info!(target: LOG_TARGET, "Formatted {}", path.display());
        Ok(true)
    }

    async fn report(&self, progress: &BatchProgress) {
        log::debug!(target: LOG_TARGET, "{}", progress.message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_file;
    use tempfile::TempDir;
    use tower_lsp_server::ls_types::Range;

    fn edit(text: &str) -> FullDocumentEdit {
        FullDocumentEdit {
            range: Range::default(),
            new_text: text.to_string(),
            version: None,
        }
    }

    #[tokio::test]
    async fn writes_formatted_text() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("lib.rs");
        write_file(&path, "fn a(){}");
        let host = DiskHost::new();

        assert_eq!(host.load(&path).await.expect("load").text, "fn a(){}");
        assert!(host.apply(&path, edit("fn a() {}\n")).await.expect("apply"));

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "fn a() {}\n");
        assert!(host.needs_formatting().is_empty());
    }

    #[tokio::test]
    async fn check_mode_records_without_writing() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("lib.rs");
        write_file(&path, "fn a(){}");
        let host = DiskHost::check_only();

        assert!(host.apply(&path, edit("fn a() {}\n")).await.expect("apply"));

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "fn a(){}");
        assert_eq!(host.needs_formatting(), vec![path]);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let err = DiskHost::new()
            .load(&dir.path().join("absent.rs"))
            .await
            .expect_err("missing file");
        assert!(matches!(err, FormatError::Io { .. }));
    }
}
