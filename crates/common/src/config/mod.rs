//! Configuration management for DocQA
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml, config/local.toml)
//! - Default values
//!
//! `DOCQA_CONFIG` points the gateway at a single file instead of the layered set.

use crate::errors::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Source document configuration
    #[serde(default)]
    pub document: DocumentConfig,

    /// Curated question bank configuration
    #[serde(default)]
    pub question_bank: QuestionBankConfig,

    /// Entity extraction configuration
    #[serde(default)]
    pub nlp: NlpConfig,

    /// Summarization model configuration
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Text generation model configuration
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request answer timeout in seconds (0 disables)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum concurrent requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    /// Path of the source document (PDF, or .txt/.md read as plain text)
    #[serde(default = "default_document_path")]
    pub path: String,

    /// Maximum chunk length in characters when gathering relevant text
    #[serde(default = "default_chunk_length")]
    pub chunk_length: usize,

    /// Also match terms that start in a chunk and continue into the next one
    #[serde(default = "default_true")]
    pub boundary_lookahead: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuestionBankConfig {
    /// Path of the JSON question bank
    #[serde(default = "default_question_bank_path")]
    pub path: String,

    /// Whether raw tokens count towards the match score
    #[serde(default)]
    pub match_mode: MatchMode,
}

/// What the question bank scores against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Named entities only
    #[default]
    Entities,
    /// Named entities and every raw token
    EntitiesAndTokens,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NlpConfig {
    /// Longest utterance the tagger accepts, in characters
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummarizerConfig {
    /// Inference endpoint; the offline lead summarizer is used when unset
    pub endpoint: Option<String>,

    /// Bearer token for the endpoint
    pub api_key: Option<String>,

    /// Maximum summary length in tokens
    #[serde(default = "default_summary_max_length")]
    pub max_length: usize,

    /// Minimum summary length in tokens
    #[serde(default = "default_summary_min_length")]
    pub min_length: usize,

    /// Length penalty passed to beam search
    #[serde(default = "default_length_penalty")]
    pub length_penalty: f32,

    /// Beam count
    #[serde(default = "default_num_beams")]
    pub num_beams: u32,

    /// HTTP timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Chat completions endpoint
    #[serde(default = "default_generator_endpoint")]
    pub endpoint: String,

    /// API key; the offline generator is used when unset
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_generator_model")]
    pub model: String,

    /// Maximum output tokens
    #[serde(default = "default_generator_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_true")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }
fn default_request_timeout() -> u64 { 120 }
fn default_max_concurrent() -> usize { 32 }
fn default_document_path() -> String { "java.pdf".to_string() }
fn default_chunk_length() -> usize { 150 }
fn default_question_bank_path() -> String { "data.json".to_string() }
fn default_max_input_chars() -> usize { 2000 }
fn default_summary_max_length() -> usize { 200 }
fn default_summary_min_length() -> usize { 50 }
fn default_length_penalty() -> f32 { 1.5 }
fn default_num_beams() -> u32 { 4 }
fn default_model_timeout() -> u64 { 120 }
fn default_generator_endpoint() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_generator_model() -> String { "gpt-4o-mini".to_string() }
fn default_generator_max_tokens() -> usize { 256 }
fn default_temperature() -> f32 { 0.7 }
fn default_log_level() -> String { "info".to_string() }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "docqa".to_string() }
fn default_rate_limit() -> u32 { 20 }
fn default_burst() -> u32 { 40 }
fn default_true() -> bool { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: default_document_path(),
            chunk_length: default_chunk_length(),
            boundary_lookahead: default_true(),
        }
    }
}

impl Default for QuestionBankConfig {
    fn default() -> Self {
        Self {
            path: default_question_bank_path(),
            match_mode: MatchMode::default(),
        }
    }
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            max_length: default_summary_max_length(),
            min_length: default_summary_min_length(),
            length_penalty: default_length_penalty(),
            num_beams: default_num_beams(),
            timeout_secs: default_model_timeout(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_generator_endpoint(),
            api_key: None,
            model: default_generator_model(),
            max_tokens: default_generator_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_model_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_true(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_true(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., APP__DOCUMENT__PATH=manual.pdf
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load from a specific file, still honouring environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Get request timeout as Duration, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.server.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.document.chunk_length, 150);
        assert_eq!(config.summarizer.max_length, 200);
        assert_eq!(config.summarizer.min_length, 50);
        assert_eq!(config.summarizer.num_beams, 4);
        assert_eq!(config.question_bank.match_mode, MatchMode::Entities);
        assert!(config.document.boundary_lookahead);
    }

    #[test]
    fn test_request_timeout_disabled() {
        let mut config = AppConfig::default();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(120)));
        config.server.request_timeout_secs = 0;
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[document]\npath = \"manual.txt\"\n\n[question_bank]\nmatch_mode = \"entities_and_tokens\""
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.document.path, "manual.txt");
        assert_eq!(config.document.chunk_length, 150);
        assert_eq!(config.question_bank.match_mode, MatchMode::EntitiesAndTokens);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_from_file_rejects_bad_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = \"not-a-port\"").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_from_file_missing_is_configuration_error() {
        let err = AppConfig::from_file("/nonexistent/docqa.toml").unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
