//! Backend for any vendor speaking the OpenAI chat-completions protocol.
//!
//! Uses [`async_openai`] for the wire types. Vendor endpoints come from
//! [`config::OpenAiCompatConfig`].

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    FinishReason as ChatFinish,
};
use secrecy::ExposeSecret;

use sherpa_core::llm::provider::LlmProvider;
use sherpa_types::llm::{
    FinishReason, Generation, GenerationRequest, LlmError, Message, MessageRole, TokenUsage,
};

use self::config::OpenAiCompatConfig;

use super::status_error;

/// Does NOT derive Debug: the API key lives inside the `async_openai::Client`.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
    max_output_tokens: u32,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
            max_output_tokens: config.max_output_tokens,
        }
    }

    fn chat_request(&self, request: &GenerationRequest) -> CreateChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(request.system.clone()),
                name: None,
            },
        ));
        messages.extend(request.messages.iter().map(chat_message));

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature as f32),
            ..Default::default()
        }
    }
}

fn chat_message(message: &Message) -> ChatCompletionRequestMessage {
    match message.role {
        MessageRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(message.content.clone()),
            name: None,
        }),
        MessageRole::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    message.content.clone(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

fn finish_reason(reason: Option<&ChatFinish>) -> FinishReason {
    match reason {
        Some(ChatFinish::Length) => FinishReason::Truncated,
        Some(ChatFinish::ContentFilter) => FinishReason::Filtered,
        _ => FinishReason::Complete,
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        let response = self
            .client
            .chat()
            .create(self.chat_request(request))
            .await
            .map_err(map_openai_error)?;

        let choice = response.choices.first();
        let text = choice
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        let finish = finish_reason(choice.and_then(|c| c.finish_reason.as_ref()));

        let usage = response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Generation {
            text,
            model: response.model,
            finish,
            usage,
        })
    }
}

const AUTH_MARKERS: &[&str] = &["Incorrect API key", "Invalid API key", "API key not valid"];

fn map_openai_error(err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::ApiError(api) => {
            let code = api.code.as_deref().unwrap_or("");
            let kind = api.r#type.as_deref().unwrap_or("");

            if code == "authentication_error"
                || kind == "authentication_error"
                || AUTH_MARKERS.iter().any(|m| api.message.contains(m))
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || kind == "rate_limit_error" {
                LlmError::RateLimited
            } else if code == "context_length_exceeded"
                || api.message.contains("maximum context length")
            {
                LlmError::Rejected(api.message)
            } else if code == "server_error" || kind == "overloaded_error" {
                LlmError::Overloaded(api.message)
            } else {
                LlmError::Backend(api.message)
            }
        }
        OpenAIError::Reqwest(e) => match e.status() {
            Some(status) => status_error(status.as_u16(), e.to_string()),
            None => LlmError::Transport(e.to_string()),
        },
        OpenAIError::JSONDeserialize(_, content) => LlmError::Decode(content),
        OpenAIError::InvalidArgument(msg) => LlmError::Rejected(msg),
        other => LlmError::Backend(other.to_string()),
    }
}
