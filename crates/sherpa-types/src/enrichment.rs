//! Records returned by the context enrichment collaborators.

use serde::{Deserialize, Serialize};

use crate::tour::{Coordinates, Place};

/// A nearby point of interest as returned by the places backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl PlaceCandidate {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Convert into a map-renderable place, or `None` if the coordinates
    /// are unusable.
    pub fn to_place(&self) -> Option<Place> {
        Place::new(
            self.display_name.clone(),
            self.coordinates(),
            self.rating.unwrap_or(crate::tour::DEFAULT_RATING),
        )
    }
}

/// Descriptive details for a single named place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetailRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_to_place_defaults_rating() {
        let candidate = PlaceCandidate {
            display_name: "Charminar".to_string(),
            latitude: 17.3616,
            longitude: 78.4747,
            rating: None,
        };
        let place = candidate.to_place().unwrap();
        assert_eq!(place.display_name, "Charminar");
        assert_eq!(place.rating, 4.0);
    }

    #[test]
    fn test_candidate_with_bad_coordinates_is_dropped() {
        let candidate = PlaceCandidate {
            display_name: "Broken".to_string(),
            latitude: 200.0,
            longitude: 0.0,
            rating: Some(4.5),
        };
        assert!(candidate.to_place().is_none());
    }

    #[test]
    fn test_detail_record_skips_empty_fields() {
        let record = PlaceDetailRecord {
            id: "abc".to_string(),
            display_name: "Gateway of India".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("summary").is_none());
        assert!(json.get("reviews").is_none());
        assert_eq!(json["display_name"], "Gateway of India");
    }
}
