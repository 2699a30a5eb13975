mod answer;
mod document;
mod embedding;
mod setting;

pub use answer::{Answer, ContextReport, SourceChunk};
pub use document::{
    Document, DocumentChunk, DocumentFailure, DocumentStatus, IndexedChunk, SearchResult,
};
pub use embedding::Embedding;
pub use setting::{keys as setting_keys, Setting, SettingCategory};
