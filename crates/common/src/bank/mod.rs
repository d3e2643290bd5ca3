//! Curated question bank
//!
//! A small ordered table of question/answer pairs loaded from JSON:
//!
//! ```json
//! { "questions": [ { "question": "What is Java", "answer": "A programming language" } ] }
//! ```

use crate::config::MatchMode;
use crate::errors::QuestionBankError;
use crate::nlp::Annotation;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// One curated question and its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QAEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Deserialize)]
struct BankFile {
    questions: Vec<QAEntry>,
}

/// Ordered question bank; order is the tie-break priority
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    entries: Vec<QAEntry>,
    match_mode: MatchMode,
}

impl QuestionBank {
    pub fn new(entries: Vec<QAEntry>, match_mode: MatchMode) -> Self {
        Self { entries, match_mode }
    }

    /// Load the bank from a JSON file
    pub fn load(path: impl AsRef<Path>, match_mode: MatchMode) -> Result<Self, QuestionBankError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let raw = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                QuestionBankError::NotFound { path: shown.clone() }
            } else {
                QuestionBankError::Io { path: shown.clone(), source }
            }
        })?;

        let bank = Self::from_json(&raw, match_mode).map_err(|source| QuestionBankError::Format {
            path: shown.clone(),
            source,
        })?;

        info!(path = %shown, entries = bank.len(), mode = ?match_mode, "Question bank loaded");
        Ok(bank)
    }

    /// Parse the bank from a JSON string
    pub fn from_json(raw: &str, match_mode: MatchMode) -> Result<Self, serde_json::Error> {
        let file: BankFile = serde_json::from_str(raw)?;
        Ok(Self::new(file.questions, match_mode))
    }

    pub fn entries(&self) -> &[QAEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    /// Entry whose question shares the most terms with the annotation.
    ///
    /// Each entity (and, in `EntitiesAndTokens` mode, each token) that occurs
    /// case-insensitively in the question adds one point. The strictly highest
    /// non-zero score wins; the earliest entry wins ties.
    pub fn best_match(&self, annotation: &Annotation) -> Option<&QAEntry> {
        let mut terms: Vec<String> = annotation
            .entities
            .iter()
            .map(|entity| entity.text.to_lowercase())
            .collect();

        if self.match_mode == MatchMode::EntitiesAndTokens {
            terms.extend(annotation.tokens.iter().map(|token| token.to_lowercase()));
        }
        terms.retain(|term| !term.trim().is_empty());

        if terms.is_empty() {
            return None;
        }

        let mut best: Option<(&QAEntry, usize)> = None;

        for entry in &self.entries {
            let question = entry.question.to_lowercase();
            let score = terms.iter().filter(|term| question.contains(term.as_str())).count();

            if score > best.map_or(0, |(_, top)| top) {
                best = Some((entry, score));
            }
        }

        if let Some((entry, score)) = best {
            debug!(question = %entry.question, score, "Question bank match");
        }

        best.map(|(entry, _)| entry)
    }
}
