//! DocQA Common Library
//!
//! Core of the document question-answering service:
//! - Source document loading, caching and chunking
//! - Curated question bank
//! - Entity extraction and intent routing
//! - Summarizer and generator clients
//! - Answer resolution pipeline
//! - Error types, configuration and metrics

pub mod bank;
pub mod config;
pub mod document;
pub mod errors;
pub mod intent;
pub mod metrics;
pub mod models;
pub mod nlp;
pub mod resolver;

// Re-export commonly used types
pub use bank::{QAEntry, QuestionBank};
pub use config::AppConfig;
pub use document::{DocumentSource, DocumentStore};
pub use errors::{AppError, ResolveError, Result};
pub use intent::{Intent, IntentKind, IntentRouter};
pub use resolver::{AnswerResolver, AnswerSource, Resolution, ResolverOptions};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
