use sherpa_types::llm::Message;
use sherpa_types::tour::PreferenceRecord;

use crate::normalize::StepResult;

use super::{TurnClassifier, history_json};

const PREFERENCES_SYSTEM_PROMPT: &str = r#"You are a professional Personal Tour Guide taking a visitor on a city walk.
You will be provided the entire conversation history between the visitor and the assistant.
Infer the visitor's interests and preferences from it.

- If the visitor mentions they like something (museums, walking, hidden gems), add it to "likes".
- If the visitor says they want to avoid something (e.g. "I don't want to go to Times Square"), add it to "dislikes".
- If the visitor mentions something they did in the past, add a short summary to "visited".
- If the visitor mentions their age, education or profession, fill in those fields.

Only use explicit and clear statements made by the visitor. Do not make assumptions.
Location data supplied with a user turn (physical location, search location, landmark lists) is device metadata, not a preference. Never include it.

Return the preferences in exactly this JSON format:
{
    "likes": ["museums", "walking"],
    "dislikes": ["crowded places", "loud music"],
    "age": "30",
    "education": "PhD",
    "profession": "engineer",
    "visited": ["museum", "park", "restaurant"]
}

Use empty strings and empty arrays for anything the visitor has not stated.

IMPORTANT: Return ONLY valid JSON in the exact format shown above, no additional text."#;

impl TurnClassifier {
    /// Recompute the visitor's preferences from the whole conversation.
    ///
    /// On failure `previous` is returned unchanged. An empty history yields
    /// an empty record without a model call.
    #[tracing::instrument(
        name = "infer_preferences",
        skip(self, history, previous),
        fields(history_len = history.len())
    )]
    pub async fn infer_preferences(
        &self,
        history: &[Message],
        previous: &PreferenceRecord,
    ) -> StepResult<PreferenceRecord> {
        if history.is_empty() {
            return StepResult::Success(PreferenceRecord::default());
        }

        let payload = format!("CONVERSATION HISTORY:\n{}", history_json(history));
        self.classify(
            "infer_preferences",
            PREFERENCES_SYSTEM_PROMPT,
            payload,
            0.5,
            2000,
            previous.clone(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::box_provider::BoxLlmProvider;
    use crate::llm::testing::ScriptedProvider;

    fn classifier(provider: ScriptedProvider) -> TurnClassifier {
        TurnClassifier::new(Arc::new(BoxLlmProvider::new(provider)))
    }

    fn history() -> Vec<Message> {
        vec![
            Message::user("I love museums but I hate crowded places"),
            Message::assistant("Then the Rubin Museum is a quiet choice."),
        ]
    }

    #[tokio::test]
    async fn test_infers_explicit_likes() {
        let provider = ScriptedProvider::always(
            r#"```json
{"likes": ["museums"], "dislikes": ["crowded places"], "age": "", "education": "", "profession": "", "visited": []}
```"#,
        );
        let calls = provider.calls();
        let result = classifier(provider)
            .infer_preferences(&history(), &PreferenceRecord::default())
            .await;

        let prefs = result.into_value();
        assert_eq!(prefs.likes, vec!["museums".to_string()]);
        assert_eq!(prefs.dislikes, vec!["crowded places".to_string()]);
        let recorded = calls.lock().unwrap();
        assert_eq!(recorded[0].temperature, 0.5);
        assert_eq!(recorded[0].max_tokens, 2000);
    }

    #[tokio::test]
    async fn test_partial_record_backfills_missing_fields() {
        let result = classifier(ScriptedProvider::always(r#"{"profession": "architect"}"#))
            .infer_preferences(&history(), &PreferenceRecord::default())
            .await;
        let prefs = result.into_value();
        assert_eq!(prefs.profession, "architect");
        assert!(prefs.likes.is_empty());
        assert!(prefs.visited.is_empty());
    }

    #[tokio::test]
    async fn test_deterministic_for_fixed_model() {
        let reply = r#"{"likes": ["street food", "walking"], "visited": ["Louvre"]}"#;
        let first = classifier(ScriptedProvider::always(reply))
            .infer_preferences(&history(), &PreferenceRecord::default())
            .await
            .into_value();
        let second = classifier(ScriptedProvider::always(reply))
            .infer_preferences(&history(), &PreferenceRecord::default())
            .await
            .into_value();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_null_fields_keep_stated_likes() {
        let reply = r#"{"likes": ["art museums", "quiet cafes"], "dislikes": [], "age": null, "education": null, "profession": null, "visited": null}"#;
        let history = vec![
            Message::user("I love art museums and quiet cafes"),
            Message::assistant("The Frick Collection is perfect for you."),
        ];
        let result = classifier(ScriptedProvider::always(reply))
            .infer_preferences(&history, &PreferenceRecord::default())
            .await;

        assert!(result.is_success());
        let prefs = result.into_value();
        assert_eq!(
            prefs.likes,
            vec!["art museums".to_string(), "quiet cafes".to_string()]
        );
        assert!(prefs.age.is_empty());
        assert!(prefs.visited.is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous() {
        let previous = PreferenceRecord {
            likes: vec!["parks".to_string()],
            ..Default::default()
        };
        let result = classifier(ScriptedProvider::failing())
            .infer_preferences(&history(), &previous)
            .await;
        assert!(!result.is_success());
        assert_eq!(result.into_value(), previous);
    }

    #[tokio::test]
    async fn test_empty_history_skips_model() {
        let provider = ScriptedProvider::failing();
        let calls = provider.calls();
        let result = classifier(provider)
            .infer_preferences(&[], &PreferenceRecord::default())
            .await;
        assert!(result.is_success());
        assert!(result.into_value().is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }
}
