use serde::Deserialize;

use crate::normalize::StepResult;

use super::{DEFAULT_LANGUAGE, TurnClassifier, non_blank};

const LANGUAGE_SYSTEM_PROMPT: &str = r#"You will be provided with the user query.
Based on the user query, classify the language of the user query.

Return the language name in the following JSON format:
{
    "language": "language"
}

IMPORTANT: Return ONLY valid JSON, no additional text."#;

#[derive(Debug, Deserialize)]
struct LanguageRecord {
    #[serde(default)]
    language: Option<String>,
}

impl TurnClassifier {
    /// Detect the natural language of `query` (e.g. "Spanish").
    ///
    /// Defaults to English on failure or for an empty query, which is
    /// answered without a model call.
    #[tracing::instrument(name = "detect_language", skip(self, query), fields(query_len = query.len()))]
    pub async fn detect_language(&self, query: &str) -> StepResult<String> {
        if query.trim().is_empty() {
            return StepResult::Success(DEFAULT_LANGUAGE.to_string());
        }

        let payload = format!("USER QUERY:\n{query}");
        self.classify(
            "detect_language",
            LANGUAGE_SYSTEM_PROMPT,
            payload,
            0.3,
            100,
            LanguageRecord { language: None },
        )
        .await
        .map(|record| non_blank(record.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()))
    }
}
