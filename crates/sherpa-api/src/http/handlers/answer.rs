//! Visitor turn endpoint.
//!
//! - POST /answer         - compatible with the original mobile client
//! - POST /api/v1/answer  - same handler
//!
//! The query may arrive in the JSON body or as the `query` URL parameter.
//! The body carries the turn metadata either nested under `metadata` or
//! inline (`{city, is_first_request}`).
//!
//! This endpoint always answers 200 with a `TurnResponse`. Malformed input
//! and panics inside the turn become the boundary apology.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use serde::Deserialize;

use sherpa_types::tour::{CityHint, SessionId, TurnMetadata, TurnRequest, TurnResponse};

use crate::state::AppState;

/// URL parameters accepted by the answer endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct AnswerParams {
    pub query: Option<String>,
    pub session_id: Option<String>,
}

/// JSON body of the answer endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct AnswerBody {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<TurnMetadata>,
    #[serde(default)]
    pub city: Option<CityHint>,
    #[serde(default, alias = "isFirstTurn")]
    pub is_first_request: Option<bool>,
}

impl AnswerBody {
    /// Nested metadata wins over the inline fields.
    fn turn_metadata(&mut self) -> Option<TurnMetadata> {
        if let Some(metadata) = self.metadata.take() {
            return Some(metadata);
        }
        self.city.take().map(|city| TurnMetadata {
            city,
            is_first_request: self.is_first_request.unwrap_or(false),
        })
    }
}

/// Assemble the turn from URL parameters and body.
///
/// Returns an error message when no usable query or no city was supplied.
fn build_turn(
    params: AnswerParams,
    mut body: AnswerBody,
) -> Result<(SessionId, TurnRequest), &'static str> {
    let query = body
        .query
        .take()
        .or(params.query)
        .filter(|q| !q.trim().is_empty())
        .ok_or("missing query")?;
    let metadata = body.turn_metadata().ok_or("missing city metadata")?;
    let session_id = body
        .session_id
        .take()
        .or(params.session_id)
        .filter(|s| !s.trim().is_empty())
        .map(SessionId)
        .unwrap_or_else(SessionId::default_session);

    Ok((session_id, TurnRequest::new(query, metadata)))
}

/// POST /answer - run one visitor turn.
pub async fn answer(
    State(state): State<AppState>,
    params: Result<Query<AnswerParams>, QueryRejection>,
    body: Result<Json<AnswerBody>, JsonRejection>,
) -> Json<TurnResponse> {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Rejected answer query string");
            return Json(TurnResponse::boundary_apology());
        }
    };

    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Rejected answer body");
            return Json(TurnResponse::boundary_apology());
        }
    };

    let (session_id, request) = match build_turn(params, body) {
        Ok(turn) => turn,
        Err(reason) => {
            tracing::warn!(reason, "Unusable answer request");
            return Json(TurnResponse::boundary_apology());
        }
    };

    // A panic inside the turn surfaces here as a JoinError instead of
    // tearing down the connection.
    let guide = state.guide.clone();
    let handle = tokio::spawn(async move { guide.answer(&session_id, request).await });

    match handle.await {
        Ok(response) => Json(response),
        Err(e) => {
            tracing::error!(error = %e, "Turn task failed");
            Json(TurnResponse::boundary_apology())
        }
    }
}
