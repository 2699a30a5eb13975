mod document;
mod rag;

pub use document::DocumentService;
pub use rag::{RagPrompts, RagService};
