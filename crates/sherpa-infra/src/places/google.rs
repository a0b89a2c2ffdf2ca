//! Google Places (New) and Geocoding API client.
//!
//! - Nearby search: `POST /v1/places:searchNearby`
//! - Text search for one named place: `POST /v1/places:searchText`
//! - City geocoding: `GET /maps/api/geocode/json`
//!
//! The API key is held as a [`SecretString`] and only exposed in request
//! headers/query parameters.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use sherpa_core::enrichment::{Geocoder, PlacesProvider};
use sherpa_types::config::PlacesConfig;
use sherpa_types::enrichment::{PlaceCandidate, PlaceDetailRecord};
use sherpa_types::error::EnrichmentError;
use sherpa_types::tour::Coordinates;

use super::{map_reqwest_error, upstream_error};

const PLACES_BASE_URL: &str = "https://places.googleapis.com";
const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

const NEARBY_FIELD_MASK: &str = "places.displayName,places.location,places.rating";
const DETAILS_FIELD_MASK: &str = "places.displayName,places.formattedAddress,places.priceLevel,places.id,places.reviews,places.generativeSummary";

const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Google Maps Platform client implementing [`PlacesProvider`] and [`Geocoder`].
///
/// Without an API key every lookup fails with
/// [`EnrichmentError::MissingCredential`], which the orchestrator treats like
/// any other enrichment failure.
///
/// Does NOT derive Debug: it holds the API key.
#[derive(Clone)]
pub struct GooglePlaces {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    places_base_url: String,
    geocode_url: String,
    max_results: u32,
}

impl GooglePlaces {
    pub fn new(api_key: Option<SecretString>, config: &PlacesConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            places_base_url: PLACES_BASE_URL.to_string(),
            geocode_url: GEOCODE_URL.to_string(),
            max_results: config.max_results,
        }
    }

    /// Override both endpoints (useful for testing or proxies).
    pub fn with_endpoints(mut self, places_base_url: String, geocode_url: String) -> Self {
        self.places_base_url = places_base_url;
        self.geocode_url = geocode_url;
        self
    }

    fn api_key(&self) -> Result<&str, EnrichmentError> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret())
            .ok_or_else(|| EnrichmentError::MissingCredential("places API key".to_string()))
    }

    async fn post_places<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        field_mask: &str,
        body: serde_json::Value,
    ) -> Result<T, EnrichmentError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .post(format!("{}{}", self.places_base_url, path))
            .header("X-Goog-Api-Key", api_key)
            .header("X-Goog-FieldMask", field_mask)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, REQUEST_TIMEOUT_MS))?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EnrichmentError::Malformed(e.to_string()))
    }
}

impl PlacesProvider for GooglePlaces {
    #[tracing::instrument(skip(self, categories))]
    async fn nearby_places(
        &self,
        center: Coordinates,
        radius_m: f64,
        categories: &[String],
    ) -> Result<Vec<PlaceCandidate>, EnrichmentError> {
        let body = json!({
            "includedTypes": categories,
            "maxResultCount": self.max_results,
            "locationRestriction": {
                "circle": {
                    "center": {
                        "latitude": center.latitude,
                        "longitude": center.longitude,
                    },
                    "radius": radius_m,
                }
            }
        });

        let response: PlacesResponse = self
            .post_places("/v1/places:searchNearby", NEARBY_FIELD_MASK, body)
            .await?;
        Ok(nearby_candidates(response))
    }

    #[tracing::instrument(skip(self))]
    async fn place_details(&self, name: &str) -> Result<Option<PlaceDetailRecord>, EnrichmentError> {
        let response: PlacesResponse = self
            .post_places(
                "/v1/places:searchText",
                DETAILS_FIELD_MASK,
                json!({ "textQuery": name }),
            )
            .await?;
        Ok(first_detail(response))
    }
}

impl Geocoder for GooglePlaces {
    #[tracing::instrument(skip(self))]
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, EnrichmentError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .get(&self.geocode_url)
            .query(&[("address", city), ("key", api_key)])
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, REQUEST_TIMEOUT_MS))?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Malformed(e.to_string()))?;
        geocode_result(body)
    }
}

// --- wire shapes -----------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    places: Vec<WirePlace>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePlace {
    id: Option<String>,
    display_name: Option<LocalizedText>,
    location: Option<LatLng>,
    rating: Option<f64>,
    formatted_address: Option<String>,
    price_level: Option<String>,
    #[serde(default)]
    reviews: Vec<WireReview>,
    generative_summary: Option<GenerativeSummary>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct WireReview {
    text: Option<LocalizedText>,
}

#[derive(Debug, Deserialize)]
struct GenerativeSummary {
    overview: Option<LocalizedText>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: GeocodeLocation,
}

#[derive(Debug, Deserialize)]
struct GeocodeLocation {
    lat: f64,
    lng: f64,
}

/// Keep places that have a name and a location.
fn nearby_candidates(response: PlacesResponse) -> Vec<PlaceCandidate> {
    response
        .places
        .into_iter()
        .filter_map(|place| {
            let name = place.display_name?.text;
            let location = place.location?;
            if name.trim().is_empty() {
                return None;
            }
            Some(PlaceCandidate {
                display_name: name,
                latitude: location.latitude,
                longitude: location.longitude,
                rating: place.rating,
            })
        })
        .collect()
}

fn first_detail(response: PlacesResponse) -> Option<PlaceDetailRecord> {
    let place = response.places.into_iter().next()?;
    Some(PlaceDetailRecord {
        id: place.id.unwrap_or_default(),
        display_name: place.display_name.map(|t| t.text).unwrap_or_default(),
        formatted_address: place.formatted_address,
        price_level: place.price_level,
        summary: place
            .generative_summary
            .and_then(|s| s.overview)
            .map(|t| t.text)
            .filter(|t| !t.is_empty()),
        reviews: place
            .reviews
            .into_iter()
            .filter_map(|r| r.text.map(|t| t.text))
            .filter(|t| !t.is_empty())
            .collect(),
    })
}

fn geocode_result(body: GeocodeResponse) -> Result<Option<Coordinates>, EnrichmentError> {
    match body.status.as_str() {
        "OK" => Ok(body
            .results
            .first()
            .map(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))),
        "ZERO_RESULTS" => Ok(None),
        other => Err(EnrichmentError::Upstream {
            status: 200,
            message: format!("{other}: {}", body.error_message.unwrap_or_default()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let places = GooglePlaces::new(None, &PlacesConfig::default());
        let err = places
            .nearby_places(Coordinates::new(40.7, -74.0), 5000.0, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, EnrichmentError::MissingCredential(_)));
        let err = places.geocode("Hyderabad").await.unwrap_err();
        assert!(matches!(err, EnrichmentError::MissingCredential(_)));
    }

    #[test]
    fn test_nearby_candidates_skips_incomplete_places() {
        let json = r#"{
            "places": [
                {
                    "displayName": {"text": "Empire State Building", "languageCode": "en"},
                    "location": {"latitude": 40.7484, "longitude": -73.9857},
                    "rating": 4.7
                },
                {
                    "displayName": {"text": "Nameless Plaza", "languageCode": "en"}
                },
                {
                    "location": {"latitude": 40.0, "longitude": -73.0}
                },
                {
                    "displayName": {"text": "Bryant Park", "languageCode": "en"},
                    "location": {"latitude": 40.7536, "longitude": -73.9832}
                }
            ]
        }"#;
        let response: PlacesResponse = serde_json::from_str(json).unwrap();
        let candidates = nearby_candidates(response);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].display_name, "Empire State Building");
        assert_eq!(candidates[0].rating, Some(4.7));
        assert_eq!(candidates[1].display_name, "Bryant Park");
        assert!(candidates[1].rating.is_none());
    }

    #[test]
    fn test_empty_nearby_response() {
        let response: PlacesResponse = serde_json::from_str("{}").unwrap();
        assert!(nearby_candidates(response).is_empty());
    }

    #[test]
    fn test_first_detail_extracts_summary_and_reviews() {
        let json = r#"{
            "places": [
                {
                    "id": "ChIJ123",
                    "displayName": {"text": "Charminar", "languageCode": "en"},
                    "formattedAddress": "Charminar, Hyderabad, Telangana 500002, India",
                    "priceLevel": "PRICE_LEVEL_INEXPENSIVE",
                    "reviews": [
                        {"text": {"text": "Iconic monument.", "languageCode": "en"}},
                        {"rating": 5}
                    ],
                    "generativeSummary": {"overview": {"text": "16th-century mosque and monument."}}
                },
                {
                    "id": "ChIJ456",
                    "displayName": {"text": "Charminar Bus Stop"}
                }
            ]
        }"#;
        let response: PlacesResponse = serde_json::from_str(json).unwrap();
        let detail = first_detail(response).unwrap();
        assert_eq!(detail.id, "ChIJ123");
        assert_eq!(detail.display_name, "Charminar");
        assert_eq!(detail.price_level.as_deref(), Some("PRICE_LEVEL_INEXPENSIVE"));
        assert_eq!(detail.reviews, vec!["Iconic monument.".to_string()]);
        assert_eq!(
            detail.summary.as_deref(),
            Some("16th-century mosque and monument.")
        );
    }

    #[test]
    fn test_first_detail_none_when_no_match() {
        let response: PlacesResponse = serde_json::from_str(r#"{"places": []}"#).unwrap();
        assert!(first_detail(response).is_none());
    }

    #[test]
    fn test_geocode_ok() {
        let json = r#"{
            "status": "OK",
            "results": [{"geometry": {"location": {"lat": 17.385, "lng": 78.4867}}}]
        }"#;
        let coords = geocode_result(serde_json::from_str(json).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(coords, Coordinates::new(17.385, 78.4867));
    }

    #[test]
    fn test_geocode_zero_results_is_none() {
        let json = r#"{"status": "ZERO_RESULTS", "results": []}"#;
        assert!(geocode_result(serde_json::from_str(json).unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_geocode_denied_is_error() {
        let json = r#"{"status": "REQUEST_DENIED", "results": [], "error_message": "The provided API key is invalid."}"#;
        let err = geocode_result(serde_json::from_str(json).unwrap()).unwrap_err();
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }
}
