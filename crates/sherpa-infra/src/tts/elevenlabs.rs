//! ElevenLabs narrator with an on-disk audio cache.
//!
//! The cache file name is the SHA-256 of `text:voice`, so the URL handed to
//! the client is known before synthesis starts and repeated speech is served
//! from disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use sha2::{Digest, Sha256};

use sherpa_core::narration::Narrator;
use sherpa_types::config::NarrationConfig;
use sherpa_types::error::NarrationError;

const API_BASE_URL: &str = "https://api.elevenlabs.io";

/// URL prefix the audio directory is served under.
pub const AUDIO_ROUTE: &str = "/audio";

/// Deterministic cache file name for `text` spoken by `voice`.
pub fn audio_file_name(text: &str, voice: &str) -> String {
    let digest = Sha256::digest(format!("{text}:{voice}").as_bytes());
    format!("{:x}.mp3", digest)
}

/// ElevenLabs text-to-speech implementing [`Narrator`].
///
/// Does NOT derive Debug: it holds the API key.
pub struct ElevenLabsNarrator {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    config: NarrationConfig,
    audio_dir: PathBuf,
}

impl ElevenLabsNarrator {
    pub fn new(api_key: SecretString, config: NarrationConfig, audio_dir: PathBuf) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            base_url: API_BASE_URL.to_string(),
            config,
            audio_dir,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    fn cache_path(&self, text: &str, language: &str) -> PathBuf {
        let voice = self.config.voice_for(language);
        self.audio_dir.join(audio_file_name(text, voice))
    }

    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, NarrationError> {
        let voice = self.config.voice_for(language);
        let url = format!("{}/v1/text-to-speech/{voice}", self.base_url);
        let body = json!({
            "text": text,
            "model_id": self.config.model_for(language),
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.75,
                "speed": 1.2,
            }
        });

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", self.api_key.expose_secret())
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| NarrationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NarrationError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NarrationError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl Narrator for ElevenLabsNarrator {
    fn audio_url(&self, text: &str, language: &str) -> Option<String> {
        if !self.config.enabled || text.trim().is_empty() {
            return None;
        }
        let voice = self.config.voice_for(language);
        Some(format!("{AUDIO_ROUTE}/{}", audio_file_name(text, voice)))
    }

    #[tracing::instrument(skip(self, text), fields(text_len = text.len()))]
    async fn render(&self, text: &str, language: &str) -> Result<(), NarrationError> {
        let path = self.cache_path(text, language);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "Narration cache hit");
            return Ok(());
        }

        let audio = self.synthesize(text, language).await?;

        tokio::fs::create_dir_all(&self.audio_dir)
            .await
            .map_err(|e| NarrationError::Cache(e.to_string()))?;
        // Write then rename so a half-written file is never served.
        let partial = path.with_extension("mp3.part");
        tokio::fs::write(&partial, &audio)
            .await
            .map_err(|e| NarrationError::Cache(e.to_string()))?;
        tokio::fs::rename(&partial, &path)
            .await
            .map_err(|e| NarrationError::Cache(e.to_string()))?;

        tracing::info!(path = %path.display(), bytes = audio.len(), "Narration rendered");
        Ok(())
    }
}
