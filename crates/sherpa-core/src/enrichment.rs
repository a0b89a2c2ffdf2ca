//! Context enrichment collaborator traits.
//!
//! Defines the interfaces the orchestrator uses to gather grounding context
//! for a turn: nearby places, details about one named place, encyclopedia
//! background text and city geocoding. Uses RPITIT (native async fn in
//! traits, Rust 2024 edition). Implementations live in sherpa-infra.
//!
//! Errors never fail a turn; the orchestrator logs them and continues with
//! empty context.

use sherpa_types::enrichment::{PlaceCandidate, PlaceDetailRecord};
use sherpa_types::error::EnrichmentError;
use sherpa_types::tour::Coordinates;

/// Points-of-interest lookups.
pub trait PlacesProvider: Send + Sync {
    /// Places of the given categories within `radius_m` of `center`.
    ///
    /// No matches is an empty list, not an error.
    fn nearby_places(
        &self,
        center: Coordinates,
        radius_m: f64,
        categories: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<PlaceCandidate>, EnrichmentError>> + Send;

    /// Best text-search match for `name`, or `None` if nothing matched.
    fn place_details(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<PlaceDetailRecord>, EnrichmentError>> + Send;
}

/// Encyclopedia background lookups.
pub trait BackgroundSource: Send + Sync {
    /// Introductory text for the best article matching `topic`.
    ///
    /// No matching article is an empty string.
    fn background_text(
        &self,
        topic: &str,
    ) -> impl std::future::Future<Output = Result<String, EnrichmentError>> + Send;
}

/// City name to coordinates resolution.
pub trait Geocoder: Send + Sync {
    fn geocode(
        &self,
        city: &str,
    ) -> impl std::future::Future<Output = Result<Option<Coordinates>, EnrichmentError>> + Send;
}
