//! Generation gateway types.
//!
//! Every model call in Sherpa has the same shape: one system instruction,
//! the ordered conversation, a temperature and an output cap. The backend's
//! configured model always answers; callers never pick a model per request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Speaker of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One message of conversation history, serialized as `{role, content}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// A single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Why the backend stopped producing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The model ended its reply on its own.
    Complete,
    /// The output cap cut the reply short.
    Truncated,
    /// The backend withheld output on policy grounds.
    Filtered,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Complete => "complete",
            FinishReason::Truncated => "truncated",
            FinishReason::Filtered => "filtered",
        }
    }
}

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Raw backend output for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    /// Model that actually answered, as reported by the backend.
    pub model: String,
    pub finish: FinishReason,
    pub usage: TokenUsage,
}

/// Errors from a generation backend.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unreadable backend response: {0}")]
    Decode(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("backend overloaded: {0}")]
    Overloaded(String),

    /// The backend refused the request as sent (bad parameters, prompt too long).
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("output withheld by the content filter")]
    ContentFiltered,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Which wire protocol a configured backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::OpenAiCompatible => write!(f, "openai_compatible"),
        }
    }
}
