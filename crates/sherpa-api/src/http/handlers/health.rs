use axum::Json;
use serde_json::{Value, json};

/// GET /health - liveness probe.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
