pub mod chunking;
pub mod context;
pub mod entities;
pub mod errors;
pub mod ports;

pub use chunking::{chunk_document, chunk_text, ChunkingConfig, TextChunk};
pub use context::{assemble_context, truncate_to_tokens, ContextPiece, ContextSelection, Truncated};
pub use entities::*;
pub use errors::{DomainError, FailureKind, ReasonCode, Result, Stage};
