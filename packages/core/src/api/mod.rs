//! HTTP surface.
//!
//! Routes:
//! - `GET   /health`
//! - `GET   /metrics`
//! - `/api/user/*`: medicine creation, completion marking and listings
//! - `/api/auth/*`: OTP signup, login and profile lookup

pub mod auth;
pub mod error;
pub mod health;
pub mod medicines;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};

use crate::accounts::AccountService;
use crate::medicine::MedicineService;
use crate::metrics::{AppMetrics, CONTENT_TYPE};

pub use error::ApiError;

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub medicines: MedicineService,
    pub accounts: AccountService,
    pub metrics: Arc<AppMetrics>,
    pub pool: SqlitePool,
}

/// Assemble the full router. `main` and the integration tests share this.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::HEAD,
            Method::DELETE,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(render_metrics))
        .nest("/api/user", medicines::router())
        .nest("/api/auth", auth::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(cors)
        .with_state(state)
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(err) => {
            tracing::error!("Failed to render metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics error").into_response()
        }
    }
}

/// Count and time every routed request, labelled by its route template.
async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let started = Instant::now();
    let response = next.run(req).await;

    state
        .metrics
        .http_request_duration
        .observe(started.elapsed().as_secs_f64());
    state
        .metrics
        .http_requests_total
        .with_label_values(&[method.as_str(), path.as_str(), response.status().as_str()])
        .inc();

    response
}

/// A field older clients send either as a JSON string or a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl StringOrNumber {
    pub fn into_text(self) -> String {
        match self {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

/// Reject blank required fields with a 400.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}
