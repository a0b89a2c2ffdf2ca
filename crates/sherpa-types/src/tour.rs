//! Turn contracts and tour domain types.
//!
//! `TurnRequest` is what a caller sends for one visitor turn and
//! `TurnResponse` is the only shape a caller ever gets back. `Place` is the
//! map-renderable point of interest, always carrying full coordinates.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Speech returned when the generation step fails or yields unusable output.
pub const APOLOGY_SPEECH: &str =
    "I apologize, I'm having trouble processing that request. Could you try asking again?";

/// Speech returned when the turn fails outside the orchestrator itself.
pub const BOUNDARY_APOLOGY_SPEECH: &str = "I apologize, I'm experiencing some technical issues. \
     Could you please try asking your question again?";

/// Rating assumed for a place the model did not rate.
pub const DEFAULT_RATING: f64 = 4.0;

/// Upper bound of the rating scale.
pub const MAX_RATING: f64 = 5.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside the geographic range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A named city with its map center, as supplied by the client or geocoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityHint {
    #[serde(default)]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl CityHint {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// A point of interest rendered on the map and named in the speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
}

impl Place {
    /// Build a place, clamping the rating into `[0, 5]`.
    ///
    /// Returns `None` when the name is blank or the coordinates are out of
    /// range, so a `Place` value is always renderable.
    pub fn new(display_name: impl Into<String>, coords: Coordinates, rating: f64) -> Option<Self> {
        let display_name = display_name.into().trim().to_string();
        if display_name.is_empty() || !coords.is_valid() {
            return None;
        }
        let rating = if rating.is_finite() {
            rating.clamp(0.0, MAX_RATING)
        } else {
            DEFAULT_RATING
        };
        Some(Self {
            display_name,
            latitude: coords.latitude,
            longitude: coords.longitude,
            rating,
        })
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Identifier of a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Session used when the caller does not name one.
    pub fn default_session() -> Self {
        Self("default".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Per-turn metadata sent by the client alongside the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnMetadata {
    pub city: CityHint,
    #[serde(default, alias = "isFirstTurn")]
    pub is_first_request: bool,
}

/// One visitor turn as received by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRequest {
    pub query: String,
    pub city: CityHint,
    pub is_first_turn: bool,
}

impl TurnRequest {
    pub fn new(query: impl Into<String>, metadata: TurnMetadata) -> Self {
        Self {
            query: query.into(),
            city: metadata.city,
            is_first_turn: metadata.is_first_request,
        }
    }
}

/// The reply contract returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub locations: Vec<Place>,
    pub speech: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "audio_url")]
    pub audio_url: Option<String>,
}

impl TurnResponse {
    pub fn new(locations: Vec<Place>, speech: impl Into<String>) -> Self {
        Self {
            locations,
            speech: speech.into(),
            audio_url: None,
        }
    }

    /// Canned reply for a failed generation step.
    pub fn apology() -> Self {
        Self::new(Vec::new(), APOLOGY_SPEECH)
    }

    /// Canned reply for a failure caught at the inbound boundary.
    pub fn boundary_apology() -> Self {
        Self::new(Vec::new(), BOUNDARY_APOLOGY_SPEECH)
    }
}

/// Visitor preferences inferred from the conversation.
///
/// Deserialization is field-by-field lenient: `null` or an unexpected type
/// empties that field without failing the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    #[serde(default, deserialize_with = "lenient_list")]
    pub likes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub dislikes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub age: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub education: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub profession: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub visited: Vec<String>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

impl PreferenceRecord {
    pub fn is_empty(&self) -> bool {
        self.likes.is_empty()
            && self.dislikes.is_empty()
            && self.age.is_empty()
            && self.education.is_empty()
            && self.profession.is_empty()
            && self.visited.is_empty()
    }
}
