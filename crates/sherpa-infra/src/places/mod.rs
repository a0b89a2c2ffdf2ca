//! Points-of-interest and geocoding backends.

pub mod google;

pub use google::GooglePlaces;

use sherpa_types::error::EnrichmentError;

/// Map a transport failure to an [`EnrichmentError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout_ms: u64) -> EnrichmentError {
    if err.is_timeout() {
        EnrichmentError::Timeout(timeout_ms)
    } else if err.is_decode() {
        EnrichmentError::Malformed(err.to_string())
    } else {
        EnrichmentError::Http(err.to_string())
    }
}

/// Turn a non-2xx response into [`EnrichmentError::Upstream`].
pub(crate) async fn upstream_error(response: reqwest::Response) -> EnrichmentError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    EnrichmentError::Upstream { status, message }
}
