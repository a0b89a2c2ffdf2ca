//! Wikipedia background source.
//!
//! Two MediaWiki API calls per topic: a full-text search for the best page
//! id, then a plain-text extract of that page (intro section only by default).

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use sherpa_core::enrichment::BackgroundSource;
use sherpa_types::config::BackgroundConfig;
use sherpa_types::error::EnrichmentError;

use crate::places::{map_reqwest_error, upstream_error};

const USER_AGENT: &str = "SherpaTourGuide/1.0";

/// MediaWiki client implementing [`BackgroundSource`].
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: reqwest::Client,
    endpoint: String,
    timeout_ms: u64,
    intro_only: bool,
}

impl WikipediaClient {
    pub fn new(config: &BackgroundConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout_ms: config.timeout_ms,
            intro_only: config.intro_only,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, EnrichmentError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(params)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout_ms))?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EnrichmentError::Malformed(e.to_string()))
    }

    async fn search_page_id(&self, topic: &str) -> Result<Option<u64>, EnrichmentError> {
        let body: SearchResponse = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", topic),
                ("format", "json"),
            ])
            .await?;
        Ok(first_page_id(body))
    }

    async fn extract(&self, page_id: u64) -> Result<String, EnrichmentError> {
        let page_id = page_id.to_string();
        let mut params = vec![
            ("action", "query"),
            ("prop", "extracts"),
            ("pageids", page_id.as_str()),
            ("explaintext", "1"),
            ("format", "json"),
        ];
        if self.intro_only {
            params.push(("exintro", "1"));
        }
        let body: ExtractResponse = self.get(&params).await?;
        Ok(page_extract(body, &page_id))
    }
}

impl BackgroundSource for WikipediaClient {
    #[tracing::instrument(skip(self))]
    async fn background_text(&self, topic: &str) -> Result<String, EnrichmentError> {
        let Some(page_id) = self.search_page_id(topic).await? else {
            tracing::debug!(topic, "No encyclopedia article found");
            return Ok(String::new());
        };
        self.extract(page_id).await
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    pageid: u64,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    #[serde(default)]
    extract: String,
}

fn first_page_id(body: SearchResponse) -> Option<u64> {
    body.query?.search.first().map(|hit| hit.pageid)
}

fn page_extract(body: ExtractResponse, page_id: &str) -> String {
    body.query
        .and_then(|mut q| q.pages.remove(page_id))
        .map(|page| page.extract.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_id() {
        let json = r#"{
            "batchcomplete": "",
            "query": {
                "searchinfo": {"totalhits": 2},
                "search": [
                    {"ns": 0, "title": "Charminar", "pageid": 190424},
                    {"ns": 0, "title": "Charminar Express", "pageid": 555}
                ]
            }
        }"#;
        assert_eq!(first_page_id(serde_json::from_str(json).unwrap()), Some(190424));
    }

    #[test]
    fn test_no_search_hits() {
        let json = r#"{"query": {"searchinfo": {"totalhits": 0}, "search": []}}"#;
        assert!(first_page_id(serde_json::from_str(json).unwrap()).is_none());
        assert!(first_page_id(serde_json::from_str("{}").unwrap()).is_none());
    }

    #[test]
    fn test_page_extract() {
        let json = r#"{
            "query": {
                "pages": {
                    "190424": {
                        "pageid": 190424,
                        "title": "Charminar",
                        "extract": "The Charminar is a monument in Hyderabad.\n"
                    }
                }
            }
        }"#;
        let text = page_extract(serde_json::from_str(json).unwrap(), "190424");
        assert_eq!(text, "The Charminar is a monument in Hyderabad.");
    }

    #[test]
    fn test_page_extract_missing_page() {
        let json = r#"{"query": {"pages": {"1": {"extract": "other"}}}}"#;
        assert_eq!(page_extract(serde_json::from_str(json).unwrap(), "2"), "");
    }

    #[test]
    fn test_client_uses_config() {
        let config = BackgroundConfig {
            timeout_ms: 500,
            intro_only: false,
            ..BackgroundConfig::default()
        };
        let client = WikipediaClient::new(&config);
        assert_eq!(client.timeout_ms, 500);
        assert!(!client.intro_only);
        assert_eq!(client.endpoint, "https://en.wikipedia.org/w/api.php");
    }
}
