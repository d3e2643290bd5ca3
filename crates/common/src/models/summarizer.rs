//! Summarizers

use super::{http_client, SummaryParams, Summarizer};
use crate::errors::Result;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: SummaryParams,
    options: RequestOptions,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct SummarizationOutput {
    summary_text: String,
}

/// Client for a Hugging Face style summarization endpoint.
///
/// Sends `{"inputs", "parameters"}` and reads `[{"summary_text"}]`.
pub struct InferenceSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl InferenceSummarizer {
    pub fn new(endpoint: String, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Summarizer for InferenceSummarizer {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> anyhow::Result<String> {
        let request = SummarizationRequest {
            inputs: text,
            parameters: *params,
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = self.api_key.as_deref().filter(|key| !key.is_empty()) {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .context("Summarizer request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Summarizer API error {}: {}", status, body));
        }

        let outputs: Vec<SummarizationOutput> = response
            .json()
            .await
            .context("Failed to parse summarizer response")?;

        outputs
            .into_iter()
            .next()
            .map(|output| output.summary_text.trim().to_string())
            .ok_or_else(|| anyhow!("Empty response from summarizer"))
    }

    fn model_name(&self) -> &str {
        "inference"
    }
}

/// Offline extractive summarizer.
///
/// Keeps leading sentences, one per line, up to `max_length` words. While
/// the summary is still under `min_length` words the next sentence is taken
/// even if it has to be cut at `max_length`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadSummarizer;

impl LeadSummarizer {
    pub fn summarize_text(&self, text: &str, params: &SummaryParams) -> String {
        let max_words = params.max_length.max(1);
        let mut kept: Vec<String> = Vec::new();
        let mut word_count = 0;

        for sentence in split_sentences(text) {
            let words = sentence.split_whitespace().count();

            if word_count + words <= max_words {
                kept.push(sentence.to_string());
                word_count += words;
            } else if word_count < params.min_length.min(max_words) || kept.is_empty() {
                let room = max_words - word_count;
                kept.push(sentence.split_whitespace().take(room).collect::<Vec<_>>().join(" "));
                break;
            } else {
                break;
            }
        }

        kept.join("\n")
    }
}

#[async_trait]
impl Summarizer for LeadSummarizer {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> anyhow::Result<String> {
        Ok(self.summarize_text(text, params))
    }

    fn model_name(&self) -> &str {
        "lead"
    }
}

/// Split on `.`, `!` or `?` followed by whitespace or end of text
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                let end = i + c.len_utf8();
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}
