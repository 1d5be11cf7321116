//! Error handling types for rustfmt-ls
//!
//! Every failure a format request can hit is described here. The orchestrator
//! converts all of them into "no edits"; the front ends decide how loudly to
//! surface each kind.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Comprehensive error type for format operations
#[derive(Debug, Error)]
pub enum FormatError {
    /// The formatter binary could not be started
    #[error("Failed to run {program}: {message}")]
    Spawn { program: String, message: String },

    /// The formatter rejected its input
    #[error("rustfmt exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    /// The formatter did not finish in time and was killed
    #[error("rustfmt took longer than {}s and was terminated", timeout.as_secs())]
    TimedOut { timeout: Duration },

    /// The buffer is larger than the formatter is allowed to receive
    #[error("File is {:.2} MB, exceeds {} MB limit. Skipping format.", *size as f64 / MIB, *limit as f64 / MIB)]
    OversizeInput { size: usize, limit: usize },

    /// No buffer is known for the requested document
    #[error("Document not found: {uri}")]
    DocumentNotFound { uri: String },

    /// The document URI does not name a local file
    #[error("Not a file URI: {uri}")]
    InvalidUri { uri: String },

    /// File could not be read or written
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const MIB: f64 = 1024.0 * 1024.0;

/// Result type for format operations
pub type FormatResult<T> = Result<T, FormatError>;

/// How a front end should present an error to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Helper functions for common error patterns
impl FormatError {
    /// Create a spawn error
    pub fn spawn(program: impl Into<String>, message: impl Into<String>) -> Self {
        FormatError::Spawn {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Create a document not found error
    pub fn document_not_found(uri: impl Into<String>) -> Self {
        FormatError::DocumentNotFound { uri: uri.into() }
    }

    /// Create an invalid uri error
    pub fn invalid_uri(uri: impl Into<String>) -> Self {
        FormatError::InvalidUri { uri: uri.into() }
    }

    /// Create an IO error bound to the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FormatError::Io {
            path: path.into(),
            source,
        }
    }

    /// Timeouts and oversize inputs are warnings; everything else is an error.
    pub fn severity(&self) -> Severity {
        match self {
            FormatError::TimedOut { .. } | FormatError::OversizeInput { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether the user should see this as a popup rather than only a log line.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            FormatError::DocumentNotFound { .. } | FormatError::InvalidUri { .. } | FormatError::Io { .. }
        )
    }
}
