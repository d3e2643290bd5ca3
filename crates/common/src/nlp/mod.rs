//! Entity extraction
//!
//! Turns an utterance into an `Annotation` (entities + tokens) that drives
//! question bank matching. The extractor sits behind a trait so a
//! model-backed tagger or a test double can replace the bundled rule tagger.

mod tagger;

pub use tagger::RuleTagger;

use crate::errors::ResolveError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Entities and tokens of a single utterance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub entities: Vec<Entity>,
    pub tokens: Vec<String>,
}

/// A labelled span of the utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

/// Entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityLabel {
    /// Proper name: product, person, organisation, technology
    Name,
    /// Calendar year
    Date,
    /// Other numeral
    Cardinal,
}

/// Trait for entity extraction
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Annotate an utterance. Deterministic for a fixed model; no retries.
    async fn annotate(&self, text: &str) -> Result<Annotation, ResolveError>;

    /// Get the model name
    fn model_name(&self) -> &str;
}
