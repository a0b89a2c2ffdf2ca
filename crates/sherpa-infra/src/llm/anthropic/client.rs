//! [`AnthropicProvider`]: the Messages API (`/v1/messages`) over reqwest.
//!
//! The API key is a [`SecretString`] and only leaves it for the
//! `x-api-key` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use sherpa_core::llm::provider::LlmProvider;
use sherpa_types::llm::{Generation, GenerationRequest, LlmError, TokenUsage};

use super::types::{ErrorPayload, MessagesRequest, MessagesResponse};
use crate::llm::status_error;

const API_VERSION: &str = "2023-06-01";

/// Does NOT derive Debug.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_output_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(api_key: SecretString, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
            model: model.to_string(),
            max_output_tokens: output_limit(model),
        }
    }

    /// Point at a proxy or a local stand-in.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

fn output_limit(model: &str) -> u32 {
    if model.contains("opus") {
        32_000
    } else if model.contains("sonnet") || model.contains("haiku") {
        8_192
    } else {
        4_096
    }
}

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: &request.messages,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), error_message(&text)));
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        Ok(Generation {
            text: reply.text(),
            finish: reply.finish(),
            usage: TokenUsage {
                input_tokens: reply.usage.input_tokens,
                output_tokens: reply.usage.output_tokens,
            },
            model: reply.model,
        })
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorPayload>(body)
        .map(|p| p.error.message)
        .unwrap_or_else(|_| body.to_string())
}
