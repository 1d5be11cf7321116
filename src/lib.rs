pub mod args;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod format;
pub mod lsp;
pub mod runner;
pub mod text;

#[cfg(test)]
mod test_helpers;

pub use context::{ResolvedContext, resolve};
pub use error::{FormatError, FormatResult, Severity};
pub use format::{BatchRunner, BatchTally, FormatOutcome, Formatter};
pub use runner::{FormatTimeout, ProcessOutcome, ProcessRunner};

// Re-export the main server implementation
pub use lsp::RustfmtLs;
