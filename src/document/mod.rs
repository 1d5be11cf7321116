pub mod store;

mod model;

// Re-export main types
pub use model::{Document, DocumentSnapshot};
pub use store::DocumentStore;
