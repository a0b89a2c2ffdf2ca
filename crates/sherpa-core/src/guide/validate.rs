//! Validation of the guide reply into the wire contract.
//!
//! The model is asked for `{"locations": [Place], "speech": "..."}` but does
//! not always comply: locations arrive as bare names, with `name` instead of
//! `displayName`, with stringly-typed coordinates, or without a rating. This
//! module repairs what it can and drops the rest, so every returned `Place`
//! is well-formed. A reply without usable speech keeps its locations and
//! speaks the stock apology instead.

use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::Value;

use sherpa_types::enrichment::PlaceCandidate;
use sherpa_types::tour::{APOLOGY_SPEECH, Coordinates, DEFAULT_RATING, Place};

use crate::normalize::{NormalizeError, parse_json};

/// A validated guide reply.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideReply {
    pub locations: Vec<Place>,
    pub speech: String,
}

#[derive(Debug, Deserialize)]
struct RawReply {
    #[serde(default)]
    locations: Vec<RawLocation>,
    #[serde(default)]
    speech: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLocation {
    Name(String),
    Record(RawPlace),
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    #[serde(default, rename = "displayName", alias = "display_name", alias = "name")]
    display_name: Option<Value>,
    #[serde(default, alias = "lat")]
    latitude: Option<Value>,
    #[serde(default, alias = "lng", alias = "lon")]
    longitude: Option<Value>,
    #[serde(default)]
    rating: Option<Value>,
}

/// Parse and repair raw model output against the turn's nearby candidates.
///
/// Only output that is not a JSON object at all is an error.
pub fn validate_reply(
    raw: &str,
    candidates: &[PlaceCandidate],
) -> Result<GuideReply, NormalizeError> {
    let reply: RawReply = parse_json(raw)?;

    let speech = match reply.speech.as_ref().and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => {
            tracing::warn!("Guide reply has no speech; using the stock apology");
            APOLOGY_SPEECH.to_string()
        }
    };

    let total = reply.locations.len();
    let locations: Vec<Place> = reply
        .locations
        .into_iter()
        .filter_map(|loc| resolve_location(loc, candidates))
        .collect();

    if locations.len() < total {
        tracing::debug!(
            dropped = total - locations.len(),
            kept = locations.len(),
            "Dropped unusable locations from reply"
        );
    }

    Ok(GuideReply { locations, speech })
}

fn resolve_location(loc: RawLocation, candidates: &[PlaceCandidate]) -> Option<Place> {
    match loc {
        RawLocation::Name(name) => match_candidate(&name, candidates),
        RawLocation::Record(record) => {
            let name = record.display_name.as_ref().and_then(display_text)?;
            let coords = match (
                record.latitude.as_ref().and_then(as_f64),
                record.longitude.as_ref().and_then(as_f64),
            ) {
                (Some(lat), Some(lng)) => Coordinates::new(lat, lng),
                _ => return match_candidate(&name, candidates),
            };
            let rating = record
                .rating
                .as_ref()
                .and_then(as_f64)
                .unwrap_or(DEFAULT_RATING);
            Place::new(name, coords, rating)
        }
        RawLocation::Other(_) => None,
    }
}

/// Resolve a bare place name against the nearby candidates.
///
/// Exact case-insensitive match wins; otherwise the first candidate whose
/// name contains, or is contained in, the requested name.
fn match_candidate(name: &str, candidates: &[PlaceCandidate]) -> Option<Place> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    candidates
        .iter()
        .find(|c| c.display_name.to_lowercase() == wanted)
        .or_else(|| {
            candidates.iter().find(|c| {
                let have = c.display_name.to_lowercase();
                !have.is_empty() && (have.contains(&wanted) || wanted.contains(&have))
            })
        })
        .and_then(PlaceCandidate::to_place)
}

/// Display names arrive either as plain strings or as `{"text": ...}` objects.
fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("text").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
