use serde::Deserialize;

use sherpa_types::llm::Message;

use crate::normalize::StepResult;

use super::{TurnClassifier, history_json, non_blank};

const SEEKING_SYSTEM_PROMPT: &str = r#"You will be provided with the user query and the conversation history between the visitor and the assistant.
Based on the last user query and the conversation history, determine if the user is seeking information about a specific location.
If the user is seeking information about a specific location, return true, otherwise return false.
When true, also return the name of the location the user is asking about. If multiple locations are mentioned in the query, return the most specific one.

Positive examples:
- Tell me about the history of the city.
- Introduction to the city.
- Who lives in this place?
- Tell me about place X in location Y. (X is the most specific location, so return X)

Negative examples:
- What are some interesting places to visit in the city?
- Can you recommend some good restaurants in the city?
- What are the best places to visit in the city?

Respond in the following JSON format:
{
    "prediction": true,
    "location": "location name"
}
OR
{
    "prediction": false,
    "location": null
}

IMPORTANT: Return ONLY valid JSON, no additional text."#;

#[derive(Debug, Deserialize)]
struct SeekingRecord {
    #[serde(default)]
    prediction: bool,
    #[serde(default)]
    location: Option<String>,
}

/// Whether the visitor asked about one specific place, and which.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InformationSeeking {
    pub location: Option<String>,
}

impl InformationSeeking {
    pub fn is_seeking(&self) -> bool {
        self.location.is_some()
    }
}

impl TurnClassifier {
    /// Decide whether `query` asks about a specific named place.
    ///
    /// A positive prediction without a usable name counts as negative.
    #[tracing::instrument(
        name = "is_information_seeking",
        skip(self, query, history),
        fields(history_len = history.len())
    )]
    pub async fn is_information_seeking(
        &self,
        query: &str,
        history: &[Message],
    ) -> StepResult<InformationSeeking> {
        if query.trim().is_empty() {
            return StepResult::Success(InformationSeeking::default());
        }

        let payload = format!(
            "CONVERSATION HISTORY:\n{}\n\nUSER QUERY:\n{query}",
            history_json(history)
        );
        self.classify(
            "is_information_seeking",
            SEEKING_SYSTEM_PROMPT,
            payload,
            0.3,
            500,
            SeekingRecord {
                prediction: false,
                location: None,
            },
        )
        .await
        .map(|record| InformationSeeking {
            location: if record.prediction {
                non_blank(record.location)
            } else {
                None
            },
        })
    }
}
