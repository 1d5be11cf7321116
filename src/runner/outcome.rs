//! Terminal result of one rustfmt process.

/// How a single rustfmt process ended.
///
/// Exactly one value is produced per run; whichever event happens first
/// (exit, spawn failure, timeout, cancellation) decides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Exit code 0 with non-blank output
    Success(String),
    /// Exit code 0 but nothing (or only whitespace) on stdout
    EmptyOutput,
    /// rustfmt rejected the input; `stderr` holds its diagnostics
    NonZeroExit { code: i32, stderr: String },
    /// The binary could not be started or its pipes failed
    SpawnError(String),
    /// The caller's cancellation token fired first
    Canceled,
    /// The timeout expired first
    TimedOut,
}

impl ProcessOutcome {
    /// Formatted text, if the run produced any.
    pub fn formatted_text(&self) -> Option<&str> {
        match self {
            ProcessOutcome::Success(text) => Some(text),
            _ => None,
        }
    }
}
