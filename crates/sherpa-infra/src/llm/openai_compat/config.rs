//! Endpoint settings for OpenAI-compatible vendors.
//!
//! Known vendors differ only in base URL and output cap, so they live in one
//! table. Any other provider name is treated as a self-hosted gateway that
//! speaks the protocol and gets OpenAI's limits until `base_url` says where
//! it lives.

use secrecy::SecretString;

struct Vendor {
    name: &'static str,
    base_url: &'static str,
    max_output_tokens: u32,
}

const VENDORS: &[Vendor] = &[
    Vendor {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        max_output_tokens: 16_384,
    },
    Vendor {
        name: "gemini",
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
        max_output_tokens: 8_192,
    },
    Vendor {
        name: "mistral",
        base_url: "https://api.mistral.ai/v1",
        max_output_tokens: 32_768,
    },
    Vendor {
        name: "glm",
        base_url: "https://api.z.ai/api/paas/v4",
        max_output_tokens: 128_000,
    },
];

/// Settings for one [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    pub provider_name: String,
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub max_output_tokens: u32,
}

impl OpenAiCompatConfig {
    /// Settings for `provider`, falling back to OpenAI's endpoint for
    /// unknown names while keeping the configured name.
    pub fn for_provider(provider: &str, api_key: SecretString, model: &str) -> Self {
        let vendor = VENDORS
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(provider))
            .unwrap_or(&VENDORS[0]);

        Self {
            provider_name: provider.to_string(),
            base_url: vendor.base_url.to_string(),
            api_key,
            model: model.to_string(),
            max_output_tokens: vendor.max_output_tokens,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
