//! Formatting requests, single-document and batch.

pub mod batch;
pub mod discovery;
pub mod disk;
pub mod edit;
pub mod in_flight;
pub mod orchestrator;
pub mod outcome;
pub mod source;

pub use batch::{BatchProgress, BatchRunner, BatchTally, WorkspaceHost};
pub use discovery::{EXCLUDED_DIRS, discover_rust_files};
pub use disk::DiskHost;
pub use edit::FullDocumentEdit;
pub use in_flight::{InFlightFormat, InFlightGuard, InFlightRegistry};
pub use orchestrator::{DEFAULT_SIZE_LIMIT, Formatter};
pub use outcome::FormatOutcome;
pub use source::TextSource;
