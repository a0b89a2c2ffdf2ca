//! Generation backends.
//!
//! Two wire protocols cover every supported vendor: the Anthropic Messages
//! API and the OpenAI chat-completions protocol (OpenAI, Gemini, Mistral,
//! GLM, or any self-hosted gateway behind `base_url`). [`create_provider`]
//! picks one from the `[llm]` config section.

pub mod anthropic;
pub mod openai_compat;

use secrecy::SecretString;

use sherpa_core::llm::box_provider::BoxLlmProvider;
use sherpa_types::config::LlmConfig;
use sherpa_types::llm::{LlmError, ProviderKind};

use self::anthropic::AnthropicProvider;
use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Build the configured backend.
///
/// # Errors
///
/// Returns [`LlmError::AuthenticationFailed`] when no API key was resolved.
pub fn create_provider(
    config: &LlmConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or(LlmError::AuthenticationFailed)?;
    let base_url = config.base_url.as_deref();

    let provider = match config.provider_type {
        ProviderKind::Anthropic => {
            let mut anthropic = AnthropicProvider::new(key, &config.model);
            if let Some(url) = base_url {
                anthropic = anthropic.with_base_url(url);
            }
            BoxLlmProvider::new(anthropic)
        }
        ProviderKind::OpenAiCompatible => {
            let mut settings = OpenAiCompatConfig::for_provider(&config.provider, key, &config.model);
            if let Some(url) = base_url {
                settings = settings.with_base_url(url);
            }
            BoxLlmProvider::new(OpenAiCompatibleProvider::new(settings))
        }
    };

    tracing::debug!(
        provider = provider.name(),
        kind = %config.provider_type,
        model = %config.model,
        "Generation backend created"
    );
    Ok(provider)
}

/// Classify a non-success HTTP status from either backend.
pub(crate) fn status_error(status: u16, message: String) -> LlmError {
    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited,
        400 | 404 | 413 | 422 => LlmError::Rejected(message),
        503 | 529 => LlmError::Overloaded(message),
        _ => LlmError::Backend(format!("HTTP {status}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Option<SecretString> {
        Some(SecretString::from("test-key"))
    }

    #[test]
    fn test_default_config_builds_gemini() {
        let provider = create_provider(&LlmConfig::default(), key()).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.max_output_tokens(), 8_192);
    }

    #[test]
    fn test_anthropic_kind() {
        let config = LlmConfig {
            provider: "anthropic".to_string(),
            provider_type: ProviderKind::Anthropic,
            model: "claude-sonnet-4-20250514".to_string(),
            ..LlmConfig::default()
        };
        let provider = create_provider(&config, key()).unwrap();
        assert_eq!(provider.name(), "anthropic");
    }

    #[test]
    fn test_self_hosted_gateway_keeps_its_name() {
        let config = LlmConfig {
            provider: "local".to_string(),
            base_url: Some("http://localhost:11434/v1".to_string()),
            model: "llama3".to_string(),
            ..LlmConfig::default()
        };
        let provider = create_provider(&config, key()).unwrap();
        assert_eq!(provider.name(), "local");
    }

    #[test]
    fn test_missing_key_fails() {
        let result = create_provider(&LlmConfig::default(), None);
        assert!(matches!(result, Err(LlmError::AuthenticationFailed)));
    }

    #[test]
    fn test_status_error_classes() {
        assert!(matches!(
            status_error(401, String::new()),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(status_error(429, String::new()), LlmError::RateLimited));
        assert!(matches!(
            status_error(400, "too long".to_string()),
            LlmError::Rejected(m) if m == "too long"
        ));
        assert!(matches!(
            status_error(529, "busy".to_string()),
            LlmError::Overloaded(_)
        ));
        assert!(matches!(
            status_error(500, "boom".to_string()),
            LlmError::Backend(m) if m == "HTTP 500: boom"
        ));
    }
}
