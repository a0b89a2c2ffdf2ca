//! Application state wiring the tour guide together.
//!
//! `TourGuide` is generic over its enrichment and narration collaborators;
//! AppState pins it to the concrete infra implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use sherpa_core::guide::{GuideSettings, TourGuide};
use sherpa_core::llm::box_provider::BoxLlmProvider;
use sherpa_core::narration::{Narrator, NoNarration};
use sherpa_infra::config::{load_global_config, read_secret, resolve_data_dir};
use sherpa_infra::llm::create_provider;
use sherpa_infra::places::GooglePlaces;
use sherpa_infra::tts::ElevenLabsNarrator;
use sherpa_infra::wiki::WikipediaClient;
use sherpa_types::config::GlobalConfig;
use sherpa_types::error::NarrationError;

/// Narration backend chosen at startup.
pub enum AppNarrator {
    Disabled(NoNarration),
    ElevenLabs(ElevenLabsNarrator),
}

impl Narrator for AppNarrator {
    fn audio_url(&self, text: &str, language: &str) -> Option<String> {
        match self {
            AppNarrator::Disabled(n) => n.audio_url(text, language),
            AppNarrator::ElevenLabs(n) => n.audio_url(text, language),
        }
    }

    async fn render(&self, text: &str, language: &str) -> Result<(), NarrationError> {
        match self {
            AppNarrator::Disabled(n) => n.render(text, language).await,
            AppNarrator::ElevenLabs(n) => n.render(text, language).await,
        }
    }
}

/// Concrete type alias for the guide pinned to infra implementations.
pub type ConcreteTourGuide = TourGuide<GooglePlaces, WikipediaClient, GooglePlaces, AppNarrator>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub guide: Arc<ConcreteTourGuide>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load config, resolve secrets and wire the guide.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

        let config = load_global_config(&data_dir).await;
        let provider = create_provider(&config.llm, read_secret(&config.llm.api_key_env))
            .with_context(|| {
                format!(
                    "failed to create '{}' provider (is {} set?)",
                    config.llm.provider, config.llm.api_key_env
                )
            })?;

        Ok(Self::build(config, data_dir, provider))
    }

    /// Wire the guide from an already-loaded config and provider.
    pub fn build(config: GlobalConfig, data_dir: PathBuf, provider: BoxLlmProvider) -> Self {
        let places_key = read_secret(&config.places.api_key_env);
        if places_key.is_none() {
            tracing::warn!(
                env = %config.places.api_key_env,
                "No places API key; landmark and geocoding lookups will be empty"
            );
        }
        let places = GooglePlaces::new(places_key, &config.places);
        let background = WikipediaClient::new(&config.background);
        let narrator = build_narrator(&config, audio_dir(&data_dir));

        tracing::info!(
            provider = provider.name(),
            narration = matches!(narrator, AppNarrator::ElevenLabs(_)),
            "Tour guide ready"
        );

        let guide = TourGuide::new(
            Arc::new(provider),
            places.clone(),
            background,
            places,
            narrator,
            GuideSettings::from_config(&config),
        );

        Self {
            guide: Arc::new(guide),
            config: Arc::new(config),
            data_dir,
        }
    }

    /// Directory narration files are written to and served from.
    pub fn audio_dir(&self) -> PathBuf {
        audio_dir(&self.data_dir)
    }
}

fn audio_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("audio")
}

fn build_narrator(config: &GlobalConfig, audio_dir: PathBuf) -> AppNarrator {
    if !config.narration.enabled {
        return AppNarrator::Disabled(NoNarration);
    }
    match read_secret(&config.narration.api_key_env) {
        Some(key) => AppNarrator::ElevenLabs(ElevenLabsNarrator::new(
            key,
            config.narration.clone(),
            audio_dir,
        )),
        None => {
            tracing::warn!(
                env = %config.narration.api_key_env,
                "Narration enabled but no API key; continuing without audio"
            );
            AppNarrator::Disabled(NoNarration)
        }
    }
}
