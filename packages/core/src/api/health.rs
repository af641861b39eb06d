use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use super::AppState;

/// Liveness plus a database round-trip. `503` when SQLite is unreachable.
pub async fn health(State(state): State<AppState>) -> Response {
    let no_store = [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))];

    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (StatusCode::OK, no_store, "ok").into_response(),
        Err(err) => {
            tracing::error!("Health check failed: {}", err);
            (StatusCode::SERVICE_UNAVAILABLE, no_store, "database unavailable").into_response()
        }
    }
}
