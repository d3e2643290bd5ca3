//! Summarization and text generation clients
//!
//! Both capabilities are opaque, possibly slow, single-shot calls. Callers
//! invoke each at most once per resolution attempt; no implementation here
//! retries internally.
//!
//! Implementations:
//! - `InferenceSummarizer`: Hugging Face style summarization endpoint
//! - `LeadSummarizer`: offline extractive fallback
//! - `ChatGenerator`: OpenAI-compatible chat completions
//! - `OfflineGenerator`: fixed reply when no API key is configured

mod generator;
mod summarizer;

pub use generator::{ChatGenerator, OfflineGenerator};
pub use summarizer::{InferenceSummarizer, LeadSummarizer};

use crate::config::{GeneratorConfig, SummarizerConfig};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Length controls for a summarization call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryParams {
    pub max_length: usize,
    pub min_length: usize,
    pub length_penalty: f32,
    pub num_beams: u32,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            max_length: 200,
            min_length: 50,
            length_penalty: 1.5,
            num_beams: 4,
        }
    }
}

impl From<&SummarizerConfig> for SummaryParams {
    fn from(config: &SummarizerConfig) -> Self {
        Self {
            max_length: config.max_length,
            min_length: config.min_length,
            length_penalty: config.length_penalty,
            num_beams: config.num_beams,
        }
    }
}

/// Trait for text summarization
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Shorten `text`; errors are plain messages wrapped by the caller
    async fn summarize(&self, text: &str, params: &SummaryParams) -> anyhow::Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Trait for open-ended text generation
#[async_trait]
pub trait Generator: Send + Sync {
    /// Continue or answer `prompt`
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Pick the summarizer for the configuration
pub fn build_summarizer(config: &SummarizerConfig) -> Result<Arc<dyn Summarizer>> {
    match config.endpoint.as_deref().filter(|endpoint| !endpoint.is_empty()) {
        Some(endpoint) => {
            info!(endpoint, "Using inference summarizer");
            let summarizer = InferenceSummarizer::new(
                endpoint.to_string(),
                config.api_key.clone(),
                config.timeout_secs,
            )?;
            Ok(Arc::new(summarizer))
        }
        None => {
            info!("No summarizer endpoint configured, using lead summarizer");
            Ok(Arc::new(LeadSummarizer))
        }
    }
}

/// Pick the generator for the configuration
pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn Generator>> {
    match config.api_key.as_deref().filter(|key| !key.is_empty()) {
        Some(_) => {
            info!(endpoint = %config.endpoint, model = %config.model, "Using chat generator");
            Ok(Arc::new(ChatGenerator::new(config.clone())?))
        }
        None => {
            info!("No generator API key configured, using offline generator");
            Ok(Arc::new(OfflineGenerator))
        }
    }
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AppError::Internal {
            message: format!("Failed to create HTTP client: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_match_config() {
        assert_eq!(SummaryParams::default(), SummaryParams::from(&SummarizerConfig::default()));
    }

    #[test]
    fn test_factories_fall_back_offline() {
        let summarizer = build_summarizer(&SummarizerConfig::default()).unwrap();
        assert_eq!(summarizer.model_name(), "lead");

        let generator = build_generator(&GeneratorConfig::default()).unwrap();
        assert_eq!(generator.model_name(), "offline");
    }

    #[test]
    fn test_factories_pick_remote_clients() {
        let summarizer = build_summarizer(&SummarizerConfig {
            endpoint: Some("http://localhost:8000/summarize".to_string()),
            ..SummarizerConfig::default()
        })
        .unwrap();
        assert_eq!(summarizer.model_name(), "inference");

        let generator = build_generator(&GeneratorConfig {
            api_key: Some("sk-test".to_string()),
            ..GeneratorConfig::default()
        })
        .unwrap();
        assert_eq!(generator.model_name(), "gpt-4o-mini");
    }
}
