//! Sequential formatting of many files.
//!
//! [`BatchRunner`] walks a list of files one at a time, sharing resolved
//! contexts between files of the same directory, and tallies what happened.
//! Where the text comes from and where edits go is up to the
//! [`WorkspaceHost`]: the LSP client for `formatWorkspace`, the filesystem
//! for the `format` subcommand.

use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::edit::FullDocumentEdit;
use super::orchestrator::Formatter;
use super::outcome::FormatOutcome;
use crate::context::ContextCache;
use crate::document::DocumentSnapshot;
use crate::error::{FormatError, FormatResult};

const LOG_TARGET: &str = "rustfmt_ls::batch";

/// Counters of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTally {
    pub formatted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub processed: usize,
    pub total: usize,
    pub canceled: bool,
}

impl BatchTally {
    /// One-line summary for the user.
    pub fn summary(&self) -> String {
        let head = if self.canceled {
            "Workspace formatting canceled."
        } else {
            "Workspace formatted."
        };
        format!(
            "{} Formatted: {}, skipped: {}, failed: {}.",
            head, self.formatted, self.skipped, self.failed
        )
    }
}

/// Progress of a batch run, reported before each file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    /// Files finished so far
    pub processed: usize,
    pub total: usize,
    /// Display name of the file about to be formatted
    pub label: String,
}

impl BatchProgress {
    pub fn message(&self) -> String {
        format!("{}/{}: {}", self.processed + 1, self.total, self.label)
    }

    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.processed * 100) / self.total) as u32
    }
}

/// The side of a batch run that owns the files.
pub trait WorkspaceHost: Sync {
    /// Current text of `path`.
    fn load(&self, path: &Path) -> impl Future<Output = FormatResult<DocumentSnapshot>> + Send;

    /// Apply a formatting edit; `Ok(false)` means the host declined it.
    fn apply(
        &self,
        path: &Path,
        edit: FullDocumentEdit,
    ) -> impl Future<Output = FormatResult<bool>> + Send;

    fn report(&self, progress: &BatchProgress) -> impl Future<Output = ()> + Send;
}

/// Formats a list of files one after another.
pub struct BatchRunner<'a> {
    formatter: &'a Formatter,
    cache: ContextCache,
    /// Stops the file in progress too, unlike the run's own cancel token
    abort: Option<&'a CancellationToken>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(formatter: &'a Formatter) -> Self {
        Self {
            formatter,
            cache: ContextCache::new(),
            abort: None,
        }
    }

    /// Kill the rustfmt run in progress when `abort` fires, e.g. on shutdown.
    pub fn with_abort(mut self, abort: &'a CancellationToken) -> Self {
        self.abort = Some(abort);
        self
    }

    /// Contexts resolved so far in this run.
    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    /// Format `files` in order until done or `cancel` fires.
    ///
    /// Cancellation stops the run before the next file. The file being
    /// formatted when it fires runs to completion and is tallied.
    pub async fn run<H: WorkspaceHost>(
        &self,
        files: &[PathBuf],
        host: &H,
        cancel: &CancellationToken,
    ) -> BatchTally {
        let mut tally = BatchTally {
            total: files.len(),
            ..Default::default()
        };
        log::info!(target: LOG_TARGET, "Formatting {} files", files.len());

        for path in files {
            if cancel.is_cancelled() {
                tally.canceled = true;
                break;
            }

            host.report(&BatchProgress {
                processed: tally.processed,
                total: tally.total,
                label: self.label_for(path),
            })
            .await;
            // Cancellation may arrive while reporting.
            if cancel.is_cancelled() {
                tally.canceled = true;
                break;
            }

            match self.format_one(path, host).await {
                Ok(FileResult::Formatted) => tally.formatted += 1,
                Ok(FileResult::Skipped) => tally.skipped += 1,
                Ok(FileResult::Declined) => {
                    log::warn!(target: LOG_TARGET, "Edit for {} was not applied", path.display());
                    tally.failed += 1;
                }
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "{}: {}", path.display(), e);
                    tally.failed += 1;
                }
            }
            tally.processed += 1;
        }

        log::info!(
            target: LOG_TARGET,
            "{} ({} contexts resolved, {} cache hits)",
            tally.summary(),
            self.cache.len(),
            self.cache.hits()
        );
        tally
    }

    async fn format_one<H: WorkspaceHost>(&self, path: &Path, host: &H) -> FormatResult<FileResult> {
        let uri = Url::from_file_path(path)
            .map_err(|()| FormatError::invalid_uri(path.to_string_lossy()))?;
        let snapshot = host.load(path).await?;
        let boundary = self.formatter.workspace_folder_for(path);
        let context = self.cache.get_or_resolve(path, boundary.as_deref()).await;

        let outcome = self
            .formatter
            .format_document(&uri, &snapshot, self.abort, Some(context))
            .await;

        match outcome {
            FormatOutcome::Replaced(edit) => Ok(if host.apply(path, edit).await? {
                FileResult::Formatted
            } else {
                FileResult::Declined
            }),
            FormatOutcome::Unchanged
            | FormatOutcome::Empty
            | FormatOutcome::Canceled
            | FormatOutcome::Stale => Ok(FileResult::Skipped),
            FormatOutcome::Failed(err) => Err(err),
        }
    }

    /// Path relative to its workspace folder, or the path itself.
    fn label_for(&self, path: &Path) -> String {
        self.formatter
            .workspace_folder_for(path)
            .and_then(|folder| path.strip_prefix(folder).ok().map(Path::to_path_buf))
            .unwrap_or_else(|| path.to_path_buf())
            .display()
            .to_string()
    }
}

enum FileResult {
    Formatted,
    Skipped,
    Declined,
}
