use serde::Deserialize;

use sherpa_types::llm::Message;

use crate::normalize::StepResult;

use super::{TurnClassifier, history_json, non_blank};

const TARGET_CITY_SYSTEM_PROMPT: &str = r#"You are a location extraction assistant. Analyze the user's query and extract ANY city or location they mention wanting to tour, visit, explore, or learn about.

IMPORTANT: Be VERY aggressive about detecting locations. If the user mentions ANY city name (like Paris, Mumbai, Tokyo, New York, Hyderabad, Bangalore, London, etc.), extract it.

Examples of queries that SHOULD return a city:
- "I want to tour Hyderabad" -> "Hyderabad, India"
- "Plan a trip to Mumbai" -> "Mumbai, India"
- "Show me places in Paris" -> "Paris, France"
- "What can I see in Tokyo?" -> "Tokyo, Japan"
- "Recommend places in New York" -> "New York, USA"
- "I'm going to London" -> "London, UK"
- "Explore Singapore" -> "Singapore"

Only return is_target_city: false if:
- The query is completely generic like "hello" or "hi"
- The query asks about a specific monument without a city context
- The query is a follow-up question about already-displayed places

Return JSON:
{
    "is_target_city": true or false,
    "target_city": "City Name, Country" or null
}

IMPORTANT: Return ONLY valid JSON, no additional text."#;

#[derive(Debug, Deserialize)]
struct TargetCityRecord {
    #[serde(default)]
    is_target_city: bool,
    #[serde(default)]
    target_city: Option<String>,
}

/// A city the visitor asked to tour, as "City, Country".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetCity {
    pub city: Option<String>,
}

impl TargetCity {
    pub fn is_detected(&self) -> bool {
        self.city.is_some()
    }

    /// Whether the detected city names the same place as `physical`.
    ///
    /// Compares the leading city component case-insensitively, so
    /// "Mumbai, India" matches a physical city of "Mumbai".
    pub fn matches(&self, physical: &str) -> bool {
        let Some(city) = &self.city else {
            return false;
        };
        let lead = |s: &str| {
            s.split(',')
                .next()
                .unwrap_or_default()
                .trim()
                .to_lowercase()
        };
        !physical.trim().is_empty() && lead(city) == lead(physical)
    }
}

impl TurnClassifier {
    /// Detect whether `query` names a city to tour.
    ///
    /// Biased toward positive detection; the orchestrator decides whether the
    /// detected city differs from where the visitor is.
    #[tracing::instrument(
        name = "detect_target_city",
        skip(self, query, history),
        fields(history_len = history.len())
    )]
    pub async fn detect_target_city(
        &self,
        query: &str,
        history: &[Message],
    ) -> StepResult<TargetCity> {
        if query.trim().is_empty() {
            return StepResult::Success(TargetCity::default());
        }

        let payload = format!(
            "CONVERSATION HISTORY:\n{}\n\nUSER QUERY:\n{query}",
            history_json(history)
        );
        let result = self
            .classify(
                "detect_target_city",
                TARGET_CITY_SYSTEM_PROMPT,
                payload,
                0.3,
                200,
                TargetCityRecord {
                    is_target_city: false,
                    target_city: None,
                },
            )
            .await
            .map(|record| TargetCity {
                city: if record.is_target_city {
                    non_blank(record.target_city)
                } else {
                    None
                },
            });

        tracing::debug!(detected = ?result.value().city, "Target city detection");
        result
    }
}
