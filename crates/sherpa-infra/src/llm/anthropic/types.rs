//! Anthropic Messages API wire types.

use serde::{Deserialize, Serialize};

use sherpa_types::llm::{FinishReason, Message};

/// Request body. Borrows the conversation; [`Message`] already serializes
/// as the `{role, content}` pair the API expects.
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub system: &'a str,
    pub messages: &'a [Message],
    pub temperature: f64,
}

/// A content block in a response. Only text blocks carry guide output.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

impl MessagesResponse {
    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect()
    }

    pub fn finish(&self) -> FinishReason {
        match self.stop_reason.as_deref() {
            Some("max_tokens") => FinishReason::Truncated,
            Some("refusal") => FinishReason::Filtered,
            _ => FinishReason::Complete,
        }
    }
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> MessagesResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_skips_non_text_blocks() {
        let resp = response(
            r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "thinking", "thinking": "...", "signature": "x"},
                {"type": "text", "text": "{\"locations\": [], "},
                {"type": "text", "text": "\"speech\": \"Hi\"}"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 8}
        }"#,
        );
        assert_eq!(resp.text(), r#"{"locations": [], "speech": "Hi"}"#);
        assert_eq!(resp.finish(), FinishReason::Complete);
        assert_eq!(resp.usage.output_tokens, 8);
    }

    #[test]
    fn test_stop_reasons() {
        let truncated = response(
            r#"{"content": [], "model": "m", "stop_reason": "max_tokens"}"#,
        );
        assert_eq!(truncated.finish(), FinishReason::Truncated);

        let refused = response(r#"{"content": [], "model": "m", "stop_reason": "refusal"}"#);
        assert_eq!(refused.finish(), FinishReason::Filtered);
    }

    #[test]
    fn test_request_shape() {
        let history = vec![Message::user("Where next?")];
        let req = MessagesRequest {
            model: "claude-sonnet-4-20250514",
            max_tokens: 100,
            system: "Be a tour guide",
            messages: &history,
            temperature: 0.5,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["system"], "Be a tour guide");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Where next?");
    }

    #[test]
    fn test_error_payload() {
        let json = r#"{"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}"#;
        let payload: ErrorPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.error.message, "Overloaded");
    }
}
