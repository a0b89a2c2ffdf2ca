//! Dialogue orchestrator.
//!
//! `TourGuide` runs one visitor turn end to end:
//!
//! ```text
//! START -> LANGUAGE_RESOLVE -> CITY_RESOLVE -> ENRICH -> GENERATE
//!       -> VALIDATE -> STATE_UPDATE -> DONE
//! ```
//!
//! Classifier and enrichment failures degrade to empty context. Only a failed
//! or unusable generation produces the apology reply, and that exchange is
//! not recorded in the conversation.

pub mod prompt;
pub mod validate;

use std::sync::Arc;

use serde_json::json;
use tracing::{Instrument, info_span};

use sherpa_types::config::GlobalConfig;
use sherpa_types::enrichment::{PlaceCandidate, PlaceDetailRecord};
use sherpa_types::llm::{LlmError, Message};
use sherpa_types::tour::{CityHint, SessionId, TurnRequest, TurnResponse};

use crate::classifier::TurnClassifier;
use crate::enrichment::{BackgroundSource, Geocoder, PlacesProvider};
use crate::llm::box_provider::BoxLlmProvider;
use crate::narration::Narrator;
use crate::normalize::NormalizeError;
use crate::session::{ConversationState, SessionStore};

use self::prompt::GuidePromptBuilder;
use self::validate::{GuideReply, validate_reply};

/// Why a turn fell back to the apology reply.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("unusable reply: {0}")]
    Unparseable(#[from] NormalizeError),
}

/// Tunables for the main reply and the nearby-places lookup.
#[derive(Debug, Clone)]
pub struct GuideSettings {
    pub temperature: f64,
    pub max_tokens: u32,
    pub radius_m: f64,
    pub categories: Vec<String>,
}

impl GuideSettings {
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            radius_m: config.places.radius_meters,
            categories: config.places.included_types.clone(),
        }
    }
}

impl Default for GuideSettings {
    fn default() -> Self {
        Self::from_config(&GlobalConfig::default())
    }
}

/// Where the turn's landmarks are searched and what the model is told.
#[derive(Debug, Clone)]
struct ResolvedLocation {
    physical: CityHint,
    effective: CityHint,
    /// Set only when a target-city override took effect.
    override_city: Option<String>,
}

/// The per-turn dialogue state machine.
///
/// Generic over the enrichment and narration collaborators; the generation
/// backend is injected as a `BoxLlmProvider`.
pub struct TourGuide<P, B, G, N> {
    provider: Arc<BoxLlmProvider>,
    classifier: TurnClassifier,
    places: P,
    background: B,
    geocoder: G,
    narrator: Arc<N>,
    sessions: SessionStore,
    settings: GuideSettings,
}

impl<P, B, G, N> TourGuide<P, B, G, N>
where
    P: PlacesProvider,
    B: BackgroundSource,
    G: Geocoder,
    N: Narrator,
{
    pub fn new(
        provider: Arc<BoxLlmProvider>,
        places: P,
        background: B,
        geocoder: G,
        narrator: N,
        settings: GuideSettings,
    ) -> Self {
        Self {
            classifier: TurnClassifier::new(Arc::clone(&provider)),
            provider,
            places,
            background,
            geocoder,
            narrator: Arc::new(narrator),
            sessions: SessionStore::new(),
            settings,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Answer one visitor turn for `session_id`.
    ///
    /// Turns for the same session are serialized; the session is locked for
    /// the whole turn. Never fails: the worst outcome is the apology reply.
    pub async fn answer(&self, session_id: &SessionId, request: TurnRequest) -> TurnResponse {
        let span = info_span!(
            "tour.turn",
            session_id = %session_id,
            first_turn = request.is_first_turn,
            city = %request.city.name,
        );

        async {
            let handle = self.sessions.get_or_create(session_id);
            let mut state = handle.lock().await;
            self.run_turn(&mut state, request).await
        }
        .instrument(span)
        .await
    }

    async fn run_turn(&self, state: &mut ConversationState, request: TurnRequest) -> TurnResponse {
        tracing::debug!(stage = "START", "Turn started");

        let query = self.resolve_language(state, &request).await;
        let location = self.resolve_city(state, &request.city, &query).await;

        tracing::debug!(stage = "ENRICH", "Gathering context");
        let (landmarks, additional_info) = tokio::join!(
            self.nearby_landmarks(&location.effective),
            self.additional_info(&query, &state.history, location.override_city.as_deref()),
        );

        let user_turn = json!({
            "user_physical_location": location.physical,
            "tour_search_location": location.effective,
            "landmarks_for_tour_location": landmarks,
            "new_query": query,
        })
        .to_string();

        let reply = match self
            .generate_reply(state, &additional_info, &user_turn, &landmarks)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Turn failed; returning apology");
                state.touch();
                return TurnResponse::apology();
            }
        };

        tracing::debug!(stage = "STATE_UPDATE", locations = reply.locations.len(), "Updating state");
        state.record_exchange(Message::user(user_turn), Message::assistant(reply.speech.clone()));
        state.preferences = self
            .classifier
            .infer_preferences(&state.history, &state.preferences)
            .await
            .into_value();

        let mut response = TurnResponse::new(reply.locations, reply.speech);
        response.audio_url = self.narrate(&response.speech, &state.language);

        tracing::info!(
            stage = "DONE",
            locations = response.locations.len(),
            turn_count = state.turn_count,
            "Turn complete"
        );
        response
    }

    /// First turn: reset and detect the session language. Later turns:
    /// translate the query into the session language.
    async fn resolve_language(&self, state: &mut ConversationState, request: &TurnRequest) -> String {
        tracing::debug!(stage = "LANGUAGE_RESOLVE", "Resolving language");
        if request.is_first_turn {
            state.reset();
            state.language = self
                .classifier
                .detect_language(&request.query)
                .await
                .into_value();
            tracing::info!(language = %state.language, "Session language set");
            request.query.clone()
        } else {
            self.classifier
                .translate(&request.query, &state.language)
                .await
                .into_value()
        }
    }

    async fn resolve_city(
        &self,
        state: &mut ConversationState,
        physical: &CityHint,
        query: &str,
    ) -> ResolvedLocation {
        tracing::debug!(stage = "CITY_RESOLVE", "Resolving city");

        if !physical.name.is_empty()
            && !state.last_city.is_empty()
            && physical.name != state.last_city
        {
            tracing::info!(
                from = %state.last_city,
                to = %physical.name,
                "City changed; clearing conversation history"
            );
            state.clear_history();
        }
        state.last_city = physical.name.clone();

        let mut location = ResolvedLocation {
            physical: physical.clone(),
            effective: physical.clone(),
            override_city: None,
        };

        let target = self
            .classifier
            .detect_target_city(query, &state.history)
            .await
            .into_value();
        let Some(city) = target.city.clone() else {
            return location;
        };
        if target.matches(&physical.name) {
            return location;
        }

        match self.geocoder.geocode(&city).await {
            Ok(Some(coords)) if coords.is_valid() => {
                tracing::info!(
                    target_city = %city,
                    latitude = coords.latitude,
                    longitude = coords.longitude,
                    "Tour location overridden"
                );
                location.effective = CityHint {
                    name: city.clone(),
                    latitude: coords.latitude,
                    longitude: coords.longitude,
                };
                location.override_city = Some(city);
            }
            Ok(_) => {
                tracing::warn!(target_city = %city, "Could not geocode target city; keeping physical location");
            }
            Err(e) => {
                tracing::warn!(target_city = %city, error = %e, "Geocoding failed; keeping physical location");
            }
        }
        location
    }

    async fn nearby_landmarks(&self, center: &CityHint) -> Vec<PlaceCandidate> {
        match self
            .places
            .nearby_places(
                center.coordinates(),
                self.settings.radius_m,
                &self.settings.categories,
            )
            .await
        {
            Ok(places) => {
                tracing::debug!(count = places.len(), city = %center.name, "Nearby landmarks");
                places
            }
            Err(e) => {
                tracing::warn!(error = %e, "Nearby places lookup failed");
                Vec::new()
            }
        }
    }

    /// Enrichment payload for the system prompt.
    ///
    /// A named place from the information-seeking classifier wins the
    /// background lookup; otherwise the override city, otherwise the raw query.
    async fn additional_info(
        &self,
        query: &str,
        history: &[Message],
        override_city: Option<&str>,
    ) -> serde_json::Value {
        let seeking = self
            .classifier
            .is_information_seeking(query, history)
            .await
            .into_value();

        match seeking.location {
            Some(name) => {
                let (details, background) =
                    tokio::join!(self.place_details(&name), self.background_text(&name));
                json!({
                    "location_info": {
                        "name": name,
                        "details": details,
                        "background": background,
                    }
                })
            }
            None => {
                let topic = override_city.unwrap_or(query);
                let background = self.background_text(topic).await;
                json!({
                    "general_info": {
                        "topic": topic,
                        "background": background,
                    }
                })
            }
        }
    }

    async fn place_details(&self, name: &str) -> Option<PlaceDetailRecord> {
        self.places
            .place_details(name)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(place = %name, error = %e, "Place details lookup failed");
                None
            })
    }

    async fn background_text(&self, topic: &str) -> String {
        if topic.trim().is_empty() {
            return String::new();
        }
        self.background
            .background_text(topic)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(topic = %topic, error = %e, "Background lookup failed");
                String::new()
            })
    }

    async fn generate_reply(
        &self,
        state: &ConversationState,
        additional_info: &serde_json::Value,
        user_turn: &str,
        landmarks: &[PlaceCandidate],
    ) -> Result<GuideReply, TurnError> {
        tracing::debug!(stage = "GENERATE", history_len = state.history.len(), "Generating reply");
        let system = GuidePromptBuilder::build(
            &state.language,
            &additional_info.to_string(),
            &state.preferences,
        );

        let mut messages = state.history.clone();
        messages.push(Message::user(user_turn));

        let raw = self
            .provider
            .generate(
                &system,
                &messages,
                self.settings.temperature,
                self.settings.max_tokens,
            )
            .await?;

        tracing::debug!(stage = "VALIDATE", "Validating reply");
        let reply = validate_reply(&raw, landmarks).inspect_err(|e| {
            tracing::warn!(
                error = %e,
                content_preview = crate::normalize::preview(&raw),
                "Guide reply failed validation"
            );
        })?;
        Ok(reply)
    }

    /// Attach the audio URL and render in the background.
    fn narrate(&self, speech: &str, language: &str) -> Option<String> {
        let url = self.narrator.audio_url(speech, language)?;
        let narrator = Arc::clone(&self.narrator);
        let speech = speech.to_string();
        let language = language.to_string();
        tokio::spawn(async move {
            if let Err(e) = narrator.render(&speech, &language).await {
                tracing::warn!(error = %e, "Narration rendering failed");
            }
        });
        Some(url)
    }
}
