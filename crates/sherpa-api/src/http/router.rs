//! Axum router configuration with middleware.
//!
//! Middleware: CORS (permissive, for the mobile client) and request tracing.
//! Narration audio is served from `{data_dir}/audio` under `/audio` when
//! narration is enabled.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/answer", post(handlers::answer::answer))
        .route("/sessions", post(handlers::session::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        .route(
            "/sessions/{id}/clear",
            post(handlers::session::clear_session),
        );

    let mut router = Router::new()
        .route("/answer", post(handlers::answer::answer))
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api_routes);

    if state.config.narration.enabled {
        let audio_dir = state.audio_dir();
        tracing::info!(path = %audio_dir.display(), "Serving narration audio");
        router = router.nest_service("/audio", ServeDir::new(audio_dir));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use sherpa_core::llm::box_provider::BoxLlmProvider;
    use sherpa_core::llm::provider::LlmProvider;
    use sherpa_types::config::GlobalConfig;
    use sherpa_types::llm::{FinishReason, Generation, GenerationRequest, LlmError, TokenUsage};
    use sherpa_types::tour::{BOUNDARY_APOLOGY_SPEECH, SessionId, TurnResponse};

    /// Answers every call with the same guide reply. Classifier calls soft-fail
    /// to their defaults, which is what a real model's off-schema output does.
    struct FixedProvider;

    impl LlmProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn max_output_tokens(&self) -> u32 {
            4_096
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<Generation, LlmError> {
            Ok(Generation {
                text: r#"{"locations": [], "speech": "Welcome to New York!"}"#.to_string(),
                model: "fixed-model".to_string(),
                finish: FinishReason::Complete,
                usage: TokenUsage::default(),
            })
        }
    }

    fn test_state() -> AppState {
        let mut config = GlobalConfig::default();
        // Unroutable so enrichment fails fast instead of reaching the network.
        config.background.endpoint = "http://127.0.0.1:9/w/api.php".to_string();
        config.places.api_key_env = "SHERPA_TEST_UNSET_PLACES_KEY".to_string();
        let provider = BoxLlmProvider::new(FixedProvider);
        AppState::build(config, PathBuf::from("/tmp/sherpa-router-test"), provider)
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn answer_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_answer_with_url_query() {
        let state = test_state();
        let app = build_router(state.clone());
        let resp = app
            .oneshot(answer_request(
                "/answer?query=Show%20me%20the%20top%203%20attractions",
                r#"{"city": {"name": "New York", "latitude": 40.7128, "longitude": -74.006}, "is_first_request": true}"#,
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let reply: TurnResponse = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(reply.speech, "Welcome to New York!");
        assert!(reply.locations.is_empty());
        assert!(json.get("audioUrl").is_none());

        let snapshot = state
            .guide
            .sessions()
            .snapshot(&SessionId::default_session())
            .await
            .unwrap();
        assert_eq!(snapshot.turn_count, 1);
        assert_eq!(snapshot.last_city, "New York");
    }

    #[tokio::test]
    async fn test_malformed_answer_body_is_boundary_apology() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(answer_request("/api/v1/answer?query=hi", "{not json"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let reply: TurnResponse = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(reply.speech, BOUNDARY_APOLOGY_SPEECH);
        assert!(reply.locations.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_query_string_is_boundary_apology() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(answer_request(
                "/answer?query=hi&query=there",
                r#"{"city": {"name": "New York", "latitude": 40.7128, "longitude": -74.006}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let reply: TurnResponse = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(reply.speech, BOUNDARY_APOLOGY_SPEECH);
        assert!(reply.locations.is_empty());
    }

    #[tokio::test]
    async fn test_missing_query_is_boundary_apology() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(answer_request(
                "/answer",
                r#"{"city": {"name": "Paris", "latitude": 48.85, "longitude": 2.35}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let reply: TurnResponse = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(reply.speech, BOUNDARY_APOLOGY_SPEECH);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let state = test_state();
        let app = build_router(state.clone());

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/sessions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let id = body_json(resp).await["data"]["session_id"]
            .as_str()
            .unwrap()
            .to_string();

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["language"], "English");
        assert_eq!(json["data"]["turn_count"], 0);

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.guide.sessions().is_empty());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["errors"][0]["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_clear_unknown_session_is_404() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/sessions/nope/clear")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
