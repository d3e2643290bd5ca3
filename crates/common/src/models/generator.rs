//! Text generators

use super::{http_client, Generator};
use crate::config::GeneratorConfig;
use crate::errors::Result;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer the user's question briefly. \
    If you are not sure of the answer, say so instead of making something up.";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// OpenAI-compatible chat completions client
pub struct ChatGenerator {
    config: GeneratorConfig,
    client: reqwest::Client,
}

impl ChatGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let client = http_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Generator for ChatGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if let Some(key) = self.config.api_key.as_deref() {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.context("Generator request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Generator API error {}: {}", status, body));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse generator response")?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| anyhow!("Empty response from generator"))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Generator used when no model is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl Generator for OfflineGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        Ok(format!(
            "I couldn't find anything in the document about \"{}\". Try asking with \
             \"What is ...?\" or \"Who is ...?\".",
            prompt.trim()
        ))
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/chat/completions", addr)
    }

    #[tokio::test]
    async fn test_chat_generator_round_trip() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["model"], "tiny-model");
                assert_eq!(body["messages"][1]["content"], "Tell me a joke");
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": " A joke. " } }]
                }))
            }),
        );
        let endpoint = serve(app).await;

        let generator = ChatGenerator::new(GeneratorConfig {
            endpoint,
            api_key: Some("sk-test".to_string()),
            model: "tiny-model".to_string(),
            ..GeneratorConfig::default()
        })
        .unwrap();

        assert_eq!(generator.generate("Tell me a joke").await.unwrap(), "A joke.");
        assert_eq!(generator.model_name(), "tiny-model");
    }

    #[tokio::test]
    async fn test_chat_generator_empty_choices() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let endpoint = serve(app).await;

        let generator = ChatGenerator::new(GeneratorConfig {
            endpoint,
            api_key: Some("sk-test".to_string()),
            ..GeneratorConfig::default()
        })
        .unwrap();

        assert!(generator.generate("hello").await.is_err());
    }

    #[tokio::test]
    async fn test_offline_generator_names_the_question() {
        let reply = OfflineGenerator.generate(" tell me about threads ").await.unwrap();
        assert!(reply.contains("\"tell me about threads\""));
    }
}
