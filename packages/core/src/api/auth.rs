//! Account endpoints under `/api/auth`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{require, ApiError, AppState, StringOrNumber};
use crate::accounts::UserProfile;

/// Header carrying the caller's user id on profile lookups.
pub const USER_ID_HEADER: &str = "user-id";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sign-up/getOtp", post(get_otp))
        .route("/sign-up/verify-otp", post(verify_otp))
        .route("/login", post(login))
        .route("/user-details", get(user_details))
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub fullname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub user_id: i64,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub user_id: i64,
    pub otp: StringOrNumber,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/sign-up/getOtp`
pub async fn get_otp(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    let Json(body) = payload?;
    require("fullname", &body.fullname)?;
    require("password", &body.password)?;
    if !body.email.contains('@') {
        return Err(ApiError::BadRequest("email is not valid".into()));
    }

    let pending_id = state
        .accounts
        .sign_up(body.fullname.trim(), body.email.trim(), &body.password)
        .await?;
    state.metrics.signups_total.inc();

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user_id: pending_id,
            message: "An OTP has been successfully sent to your registered email address",
        }),
    ))
}

/// `POST /api/auth/sign-up/verify-otp`
pub async fn verify_otp(
    State(state): State<AppState>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let otp = body
        .otp
        .into_text()
        .trim()
        .parse::<u32>()
        .map_err(|_| ApiError::BadRequest("otp must be a 6 digit number".into()))?;

    state.accounts.verify_otp(body.user_id, otp).await?;
    Ok(Json(json!({ "message": "User verified!" })))
}

/// `POST /api/auth/login`. Responds with the user id.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let user_id = state.accounts.login(body.email.trim(), &body.password).await?;
    Ok(Json(json!({ "userId": user_id })))
}

/// `GET /api/auth/user-details`
pub async fn user_details(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    if raw.is_empty() {
        return Err(ApiError::Unprocessable("Send the UID".into()));
    }

    // An id that is not a number cannot name a stored user.
    let user_id = raw
        .parse::<i64>()
        .map_err(|_| ApiError::NotFound("User not found".into()))?;

    Ok(Json(state.accounts.user_details(user_id).await?))
}
