//! Global configuration types for Sherpa.
//!
//! `GlobalConfig` represents the top-level `config.toml` that selects the
//! generation backend, tunes enrichment lookups, toggles narration and binds
//! the HTTP server.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::llm::ProviderKind;

/// Top-level configuration for the Sherpa tour guide.
///
/// Loaded from `~/.sherpa/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub places: PlacesConfig,

    #[serde(default)]
    pub background: BackgroundConfig,

    #[serde(default)]
    pub narration: NarrationConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Generation backend selection and call parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name (e.g., "gemini", "openai", "anthropic").
    #[serde(default = "default_provider_name")]
    pub provider: String,

    #[serde(default = "default_provider_type")]
    pub provider_type: ProviderKind,

    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL override for OpenAI-compatible endpoints.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,

    /// Temperature of the main guide reply.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Output token cap of the main guide reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider_name() -> String {
    "gemini".to_string()
}

fn default_provider_type() -> ProviderKind {
    ProviderKind::OpenAiCompatible
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_llm_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    4000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider_name(),
            provider_type: default_provider_type(),
            model: default_model(),
            base_url: None,
            api_key_env: default_llm_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Nearby-places lookup parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    #[serde(default = "default_radius_meters")]
    pub radius_meters: f64,

    #[serde(default = "default_max_results")]
    pub max_results: u32,

    #[serde(default = "default_included_types")]
    pub included_types: Vec<String>,

    #[serde(default = "default_places_key_env")]
    pub api_key_env: String,
}

fn default_radius_meters() -> f64 {
    5000.0
}

fn default_max_results() -> u32 {
    20
}

fn default_included_types() -> Vec<String> {
    vec!["tourist_attraction".to_string()]
}

fn default_places_key_env() -> String {
    "GOOGLE_PLACES_API_KEY".to_string()
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            radius_meters: default_radius_meters(),
            max_results: default_max_results(),
            included_types: default_included_types(),
            api_key_env: default_places_key_env(),
        }
    }
}

/// Encyclopedia lookup parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundConfig {
    #[serde(default = "default_background_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_background_timeout_ms")]
    pub timeout_ms: u64,

    /// Request only the lead section of the article.
    #[serde(default = "default_true")]
    pub intro_only: bool,
}

fn default_background_endpoint() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_background_timeout_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            endpoint: default_background_endpoint(),
            timeout_ms: default_background_timeout_ms(),
            intro_only: true,
        }
    }
}

/// Spoken-audio side channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Voice used when no per-language voice is configured.
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// Per-language voice overrides keyed by language name.
    #[serde(default)]
    pub voices: HashMap<String, String>,

    #[serde(default = "default_english_model")]
    pub english_model: String,

    #[serde(default = "default_multilingual_model")]
    pub multilingual_model: String,

    #[serde(default = "default_narration_key_env")]
    pub api_key_env: String,
}

fn default_voice_id() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_string()
}

fn default_english_model() -> String {
    "eleven_monolingual_v1".to_string()
}

fn default_multilingual_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_narration_key_env() -> String {
    "ELEVENLABS_API_KEY".to_string()
}

impl NarrationConfig {
    /// Voice for a session language, falling back to the default voice.
    pub fn voice_for(&self, language: &str) -> &str {
        self.voices
            .iter()
            .find(|(lang, _)| lang.eq_ignore_ascii_case(language))
            .map(|(_, voice)| voice.as_str())
            .unwrap_or(&self.voice_id)
    }

    /// Synthesis model for a session language.
    pub fn model_for(&self, language: &str) -> &str {
        if language.eq_ignore_ascii_case("english") {
            &self.english_model
        } else {
            &self.multilingual_model
        }
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            voice_id: default_voice_id(),
            voices: HashMap::new(),
            english_model: default_english_model(),
            multilingual_model: default_multilingual_model(),
            api_key_env: default_narration_key_env(),
        }
    }
}

/// HTTP server binding and session housekeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Sessions idle longer than this are evicted by the periodic sweep.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_session_idle_secs() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}
