use serde::Deserialize;

use crate::normalize::StepResult;

use super::{TurnClassifier, non_blank};

const TRANSLATE_SYSTEM_PROMPT: &str = r#"You will be provided with text that needs to be translated to the target language.
Translate the text to the target language. If the text is already in the target language, return it unchanged.

Return the translated text in the following JSON format:
{
    "translated_text": "translated text"
}

IMPORTANT: Return ONLY valid JSON, no additional text."#;

#[derive(Debug, Deserialize)]
struct TranslationRecord {
    #[serde(default)]
    translated_text: Option<String>,
}

impl TurnClassifier {
    /// Translate `text` into `target_language`.
    ///
    /// Returns the original text on failure, and for empty input without
    /// calling the model.
    #[tracing::instrument(name = "translate", skip(self, text), fields(text_len = text.len()))]
    pub async fn translate(&self, text: &str, target_language: &str) -> StepResult<String> {
        if text.trim().is_empty() {
            return StepResult::Success(text.to_string());
        }

        let payload = format!("TARGET LANGUAGE:\n{target_language}\n\nTEXT TO TRANSLATE:\n{text}");
        self.classify(
            "translate",
            TRANSLATE_SYSTEM_PROMPT,
            payload,
            0.3,
            500,
            TranslationRecord {
                translated_text: None,
            },
        )
        .await
        .map(|record| non_blank(record.translated_text).unwrap_or_else(|| text.to_string()))
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

    #[tokio::test]
    async fn test_translates() {
        let provider =
            ScriptedProvider::always(r#"{"translated_text": "¿Qué museos hay cerca?"}"#);
        let calls = provider.calls();
        let result = classifier(provider)
            .translate("What museums are nearby?", "Spanish")
            .await;

        assert_eq!(result.into_value(), "¿Qué museos hay cerca?");
        let recorded = calls.lock().unwrap();
        assert_eq!(recorded[0].max_tokens, 500);
        assert!(recorded[0].messages[0].content.contains("Spanish"));
    }

    #[tokio::test]
    async fn test_failure_returns_original_text() {
        let result = classifier(ScriptedProvider::always("not json"))
            .translate("Tell me about the fort", "Hindi")
            .await;
        assert!(!result.is_success());
        assert_eq!(result.into_value(), "Tell me about the fort");
    }

    #[tokio::test]
    async fn test_blank_translation_returns_original_text() {
        let result = classifier(ScriptedProvider::always(r#"{"translated_text": ""}"#))
            .translate("Show me parks", "French")
            .await;
        assert_eq!(result.into_value(), "Show me parks");
    }

    #[tokio::test]
    async fn test_empty_text_skips_model() {
        let provider = ScriptedProvider::failing();
        let calls = provider.calls();
        let result = classifier(provider).translate("", "Spanish").await;
        assert_eq!(result, StepResult::Success(String::new()));
        assert!(calls.lock().unwrap().is_empty());
    }
}
