//! Format request orchestration.
//!
//! [`Formatter`] owns everything that is process-wide: the configuration
//! snapshot, the workspace folders used as resolution boundaries, the
//! in-flight registry and the process runner. Each call to
//! [`Formatter::format_document`] coalesces with any earlier request for the
//! same document, runs rustfmt against a snapshot of the buffer and turns the
//! result into at most one full-document edit.

use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::edit::FullDocumentEdit;
use super::in_flight::InFlightRegistry;
use super::outcome::FormatOutcome;
use super::source::TextSource;
use crate::config::FormatterConfig;
use crate::context::{ResolvedContext, normalize_path, resolve};
use crate::error::FormatError;
use crate::runner::{ProcessOutcome, ProcessRunner};

const LOG_TARGET: &str = "rustfmt_ls::format";

/// Buffers larger than this are never sent to rustfmt.
pub const DEFAULT_SIZE_LIMIT: usize = 2 * 1024 * 1024;

pub struct Formatter {
    config: ArcSwap<FormatterConfig>,
    workspace_folders: ArcSwap<Vec<PathBuf>>,
    in_flight: InFlightRegistry,
    runner: ProcessRunner,
    size_limit: usize,
}

impl std::fmt::Debug for Formatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Formatter")
            .field("config", &self.config.load_full())
            .field("workspace_folders", &self.workspace_folders.load_full())
            .field("in_flight", &self.in_flight.len())
            .field("runner", &self.runner)
            .field("size_limit", &self.size_limit)
            .finish()
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(FormatterConfig::default())
    }
}

impl Formatter {
    pub fn new(config: FormatterConfig) -> Self {
        Self {
            config: ArcSwap::new(Arc::new(config)),
            workspace_folders: ArcSwap::new(Arc::new(Vec::new())),
            in_flight: InFlightRegistry::new(),
            runner: ProcessRunner::default(),
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }

    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// Replace the configuration; running requests keep their snapshot.
    pub fn update_config(&self, config: FormatterConfig) {
        log::info!(
            target: LOG_TARGET,
            "Formatter config updated: {} {:?}",
            config.tool_path,
            config.extra_args
        );
        self.config.store(Arc::new(config));
    }

    pub fn set_workspace_folders(&self, folders: Vec<PathBuf>) {
        self.workspace_folders.store(Arc::new(folders));
    }

    pub fn workspace_folders(&self) -> Arc<Vec<PathBuf>> {
        self.workspace_folders.load_full()
    }

    /// The innermost workspace folder containing `path`.
    pub fn workspace_folder_for(&self, path: &Path) -> Option<PathBuf> {
        let target = normalize_path(path);
        self.workspace_folders
            .load()
            .iter()
            .filter(|folder| target.starts_with(normalize_path(folder)))
            .max_by_key(|folder| folder.components().count())
            .cloned()
    }

    /// Cancel the running request for `uri`, if any.
    pub fn cancel(&self, uri: &Url) {
        self.in_flight.cancel(uri);
    }

    /// Format the document at `uri` as currently held by `source`.
    ///
    /// `external` cancels this request from outside (e.g. server shutdown).
    /// `context` skips resolution when the caller already has one.
    pub async fn format_document<S>(
        &self,
        uri: &Url,
        source: &S,
        external: Option<&CancellationToken>,
        context: Option<Arc<ResolvedContext>>,
    ) -> FormatOutcome
    where
        S: TextSource + ?Sized,
    {
        let (guard, previous) = self.in_flight.register(uri, external);
        if let Some(previous) = previous {
            log::debug!(
                target: LOG_TARGET,
                "Superseding format {} for {}",
                previous.id(),
                uri
            );
            previous.supersede().await;
        }
        if guard.is_canceled() {
            return FormatOutcome::Canceled;
        }

        let Some(snapshot) = source.snapshot(uri) else {
            return FormatOutcome::Failed(FormatError::document_not_found(uri.as_str()));
        };

        let size = snapshot.text.len();
        if size > self.size_limit {
            let err = FormatError::OversizeInput {
                size,
                limit: self.size_limit,
            };
            log::warn!(target: LOG_TARGET, "{}: {}", uri, err);
            return FormatOutcome::Failed(err);
        }

        let config = self.config.load_full();
        let context = match context {
            Some(context) => context,
            None => Arc::new(self.resolve_context(uri).await),
        };
        if guard.is_canceled() {
            return FormatOutcome::Canceled;
        }

        let outcome = self
            .runner
            .run(&config, &snapshot.text, &context, guard.token())
            .await;

        let formatted = match outcome {
            ProcessOutcome::Success(text) => text,
            ProcessOutcome::EmptyOutput => return FormatOutcome::Empty,
            ProcessOutcome::Canceled => return FormatOutcome::Canceled,
            ProcessOutcome::TimedOut => {
                return FormatOutcome::Failed(FormatError::TimedOut {
                    timeout: self.runner.timeout().as_duration(),
                });
            }
            ProcessOutcome::NonZeroExit { code, stderr } => {
                return FormatOutcome::Failed(FormatError::NonZeroExit { code, stderr });
            }
            ProcessOutcome::SpawnError(message) => {
                return FormatOutcome::Failed(FormatError::spawn(&config.tool_path, message));
            }
        };
        if guard.is_canceled() {
            return FormatOutcome::Canceled;
        }

        let current = source.snapshot(uri);
        if current.as_ref().map(|doc| doc.text.as_str()) != Some(snapshot.text.as_str()) {
            log::debug!(target: LOG_TARGET, "{} changed while formatting, dropping result", uri);
            return FormatOutcome::Stale;
        }

        if formatted == snapshot.text {
            log::debug!(target: LOG_TARGET, "{} already formatted", uri);
            return FormatOutcome::Unchanged;
        }

        // A newer request may have registered while the buffer was re-read.
        if guard.is_canceled() {
            return FormatOutcome::Canceled;
        }
        FormatOutcome::Replaced(FullDocumentEdit::new(&snapshot, formatted))
    }

    async fn resolve_context(&self, uri: &Url) -> ResolvedContext {
        match uri.to_file_path() {
            Ok(path) => {
                let boundary = self.workspace_folder_for(&path);
                resolve(&path, boundary.as_deref()).await
            }
            Err(()) => {
                log::debug!(target: LOG_TARGET, "{} is not a file, using empty context", uri);
                ResolvedContext::default()
            }
        }
    }
}
