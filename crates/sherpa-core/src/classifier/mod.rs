//! Turn classifier bank.
//!
//! Each classifier is a single low-temperature model call with a strict
//! "JSON only" instruction and its own output cap. Classifiers never fail the
//! turn: model errors and unparseable output both come back as
//! `StepResult::SoftFailure` carrying the classifier's default.

mod language;
mod preferences;
mod seeking;
mod target_city;
mod translate;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use sherpa_types::llm::Message;

use crate::llm::box_provider::BoxLlmProvider;
use crate::normalize::{StepResult, normalize_or};

pub use seeking::InformationSeeking;
pub use target_city::TargetCity;

/// Language assumed until a first turn says otherwise.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Bank of auxiliary classifiers sharing one generation backend.
#[derive(Clone)]
pub struct TurnClassifier {
    provider: Arc<BoxLlmProvider>,
}

impl TurnClassifier {
    pub fn new(provider: Arc<BoxLlmProvider>) -> Self {
        Self { provider }
    }

    /// Run one classification call and normalize its output into `T`.
    async fn classify<T: DeserializeOwned>(
        &self,
        site: &'static str,
        system: &str,
        payload: String,
        temperature: f64,
        max_tokens: u32,
        default: T,
    ) -> StepResult<T> {
        let history = [Message::user(payload)];
        match self
            .provider
            .generate(system, &history, temperature, max_tokens)
            .await
        {
            Ok(raw) => normalize_or(&raw, default, site),
            Err(e) => {
                tracing::warn!(site, error = %e, "Classifier call failed; using default");
                StepResult::SoftFailure {
                    value: default,
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Render conversation history for inclusion in a classifier payload.
fn history_json(history: &[Message]) -> String {
    serde_json::to_string(history).unwrap_or_else(|_| "[]".to_string())
}

/// Trimmed, non-empty string or `None`.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}
