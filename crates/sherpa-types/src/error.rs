use thiserror::Error;

/// Errors from place lookups, encyclopedia lookups and geocoding.
///
/// These never reach the caller of a turn; the orchestrator logs them and
/// continues with empty context.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("http error: {0}")]
    Http(String),

    #[error("upstream returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("malformed upstream payload: {0}")]
    Malformed(String),

    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("timed out after {0}ms")]
    Timeout(u64),
}

/// Errors from the narration side channel.
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("synthesis request failed: {0}")]
    Request(String),

    #[error("synthesis returned status {0}")]
    Status(u16),

    #[error("audio cache error: {0}")]
    Cache(String),
}

/// Errors related to session lookups.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session '{0}' not found")]
    NotFound(String),
}
