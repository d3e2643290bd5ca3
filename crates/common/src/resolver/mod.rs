//! Answer resolver - the per-request pipeline
//!
//! Stages, in order:
//! 1. Analysis: annotate the utterance (failure is fatal)
//! 2. Question bank lookup: a hit is returned verbatim
//! 3. Document retrieval: intent-specific questions about terms the
//!    document never mentions get the not-found reply
//! 4. Summarization of the chunks that mention the term
//! 5. Generation, for free-form input the document could not answer
//!
//! `resolve` keeps every failure typed; `respond` is the outer boundary that
//! flattens the outcome into the text returned to the user.

use crate::bank::QuestionBank;
use crate::config::AppConfig;
use crate::document::{Document, DocumentStore};
use crate::errors::{no_passage_message, not_found_message, ResolveError, UNEXPECTED_ERROR_MESSAGE};
use crate::intent::{IntentKind, IntentRouter};
use crate::metrics;
use crate::models::{Generator, SummaryParams, Summarizer};
use crate::nlp::EntityExtractor;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Tunables for document retrieval and summarization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverOptions {
    /// Maximum chunk length in characters
    pub chunk_length: usize,
    /// Match terms that run across a chunk boundary
    pub boundary_lookahead: bool,
    /// Length controls passed to the summarizer
    pub summary: SummaryParams,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            chunk_length: 150,
            boundary_lookahead: true,
            summary: SummaryParams::default(),
        }
    }
}

impl From<&AppConfig> for ResolverOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            chunk_length: config.document.chunk_length,
            boundary_lookahead: config.document.boundary_lookahead,
            summary: SummaryParams::from(&config.summarizer),
        }
    }
}

/// Which strategy produced the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Curated question bank entry
    QuestionBank,
    /// Summary of document text
    Document,
    /// Open-ended generation
    Generated,
    /// The document does not mention the term
    NotFound,
    /// The term is mentioned but no passage could be gathered
    NoAnswer,
}

impl AnswerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerSource::QuestionBank => "question_bank",
            AnswerSource::Document => "document",
            AnswerSource::Generated => "generated",
            AnswerSource::NotFound => "not_found",
            AnswerSource::NoAnswer => "no_answer",
        }
    }
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub answer: String,
    pub source: AnswerSource,
    pub intent: IntentKind,
}

impl Resolution {
    fn new(answer: impl Into<String>, source: AnswerSource, intent: IntentKind) -> Self {
        Self {
            answer: answer.into(),
            source,
            intent,
        }
    }
}

/// Orchestrates bank lookup, retrieval, summarization and generation.
///
/// Holds only shared, read-only handles, so one resolver serves concurrent
/// requests.
#[derive(Clone)]
pub struct AnswerResolver {
    bank: Arc<QuestionBank>,
    document: Arc<DocumentStore>,
    extractor: Arc<dyn EntityExtractor>,
    summarizer: Arc<dyn Summarizer>,
    generator: Arc<dyn Generator>,
    router: IntentRouter,
    options: ResolverOptions,
}

impl AnswerResolver {
    pub fn new(
        bank: Arc<QuestionBank>,
        document: Arc<DocumentStore>,
        extractor: Arc<dyn EntityExtractor>,
        summarizer: Arc<dyn Summarizer>,
        generator: Arc<dyn Generator>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            bank,
            document,
            extractor,
            summarizer,
            generator,
            router: IntentRouter::new(),
            options,
        }
    }

    pub fn document(&self) -> &DocumentStore {
        &self.document
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Answer an utterance. Never fails: every error becomes a message.
    pub async fn respond(&self, utterance: &str) -> String {
        let start = Instant::now();

        match AssertUnwindSafe(self.resolve(utterance)).catch_unwind().await {
            Ok(Ok(resolution)) => {
                metrics::record_resolution(resolution.source.as_str(), resolution.intent.as_str());
                info!(
                    intent = %resolution.intent,
                    source = resolution.source.as_str(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Question answered"
                );
                resolution.answer
            }
            Ok(Err(e)) => {
                metrics::record_resolution_error(e.kind());
                warn!(
                    kind = e.kind(),
                    error = %e,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Resolution failed"
                );
                e.user_message()
            }
            Err(_) => {
                metrics::record_resolution_error("panic");
                error!("Resolution panicked");
                UNEXPECTED_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Run the pipeline, keeping failures typed
    pub async fn resolve(&self, utterance: &str) -> Result<Resolution, ResolveError> {
        let annotation = self.extractor.annotate(utterance).await?;
        let intent = self.router.classify(utterance);

        debug!(
            intent = %intent.kind,
            argument = %intent.argument,
            entities = annotation.entities.len(),
            tokens = annotation.tokens.len(),
            "Utterance classified"
        );

        if let Some(entry) = self.bank.best_match(&annotation) {
            return Ok(Resolution::new(
                entry.answer.clone(),
                AnswerSource::QuestionBank,
                intent.kind,
            ));
        }

        let document = self.document.load().await?;

        if intent.kind == IntentKind::FreeForm {
            if let Some(summary) = self.summarize(document, &intent.argument).await? {
                return Ok(Resolution::new(summary, AnswerSource::Document, intent.kind));
            }

            let generated = self.generate(utterance).await?;
            return Ok(Resolution::new(generated, AnswerSource::Generated, intent.kind));
        }

        if !document.contains(&intent.argument) {
            debug!(term = %intent.argument, "Term not in document");
            return Ok(Resolution::new(
                not_found_message(&intent.argument),
                AnswerSource::NotFound,
                intent.kind,
            ));
        }

        match self.summarize(document, &intent.argument).await? {
            Some(summary) => {
                let answer = if intent.kind == IntentKind::Enumeration {
                    format_enumeration(&intent.argument, &summary)
                } else {
                    summary
                };
                Ok(Resolution::new(answer, AnswerSource::Document, intent.kind))
            }
            None => Ok(Resolution::new(
                no_passage_message(&intent.argument),
                AnswerSource::NoAnswer,
                intent.kind,
            )),
        }
    }

    /// Summarize the chunks that mention `term`; `None` when there are none
    async fn summarize(&self, document: &Document, term: &str) -> Result<Option<String>, ResolveError> {
        let relevant = document.relevant_text(
            term,
            self.options.chunk_length,
            self.options.boundary_lookahead,
        );
        if relevant.is_empty() {
            return Ok(None);
        }

        let start = Instant::now();
        let result = self.summarizer.summarize(&relevant, &self.options.summary).await;
        metrics::record_model_call(
            start.elapsed().as_secs_f64(),
            self.summarizer.model_name(),
            result.is_ok(),
        );

        let summary = result.map_err(|e| ResolveError::Summarization {
            message: format!("{:#}", e),
        })?;

        let summary = summary.trim();
        Ok((!summary.is_empty()).then(|| summary.to_string()))
    }

    async fn generate(&self, prompt: &str) -> Result<String, ResolveError> {
        let start = Instant::now();
        let result = self.generator.generate(prompt).await;
        metrics::record_model_call(
            start.elapsed().as_secs_f64(),
            self.generator.model_name(),
            result.is_ok(),
        );

        result.map_err(|e| ResolveError::Generation {
            message: format!("{:#}", e),
        })
    }
}

/// Bullet every non-blank line of `summary` under a header naming `subject`
pub fn format_enumeration(subject: &str, summary: &str) -> String {
    let bullets: Vec<String> = summary
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("- {}", line))
        .collect();

    format!("Here is what I found about {}:\n{}", subject, bullets.join("\n"))
}
