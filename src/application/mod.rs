//! Application layer - Use cases and orchestration.
//!
//! This module contains application services that orchestrate domain logic
//! and infrastructure. Services depend on domain ports (traits) rather than
//! concrete implementations.

pub mod retry;
pub mod services;
pub mod settings;
pub mod tokenizers;

pub use retry::RetryPolicy;
pub use services::{DocumentService, RagPrompts, RagService};
pub use settings::{LayeredSettings, PipelineSettings, SettingsLayer};
pub use tokenizers::TokenizerRegistry;
