//! Medicine endpoints under `/api/user`.
//!
//! - `POST  /create-med`                  schedule a new regimen
//! - `PATCH /med-taken`                   set one day's completion flag
//! - `GET   /getMedicines`                list a user's medicines (JSON body)
//! - `GET   /medicine-names/:user_id`     names only
//! - `GET   /users-by-medicine/:name`     owners of medicines with that name

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{require, ApiError, AppState, StringOrNumber};
use crate::medicine::CreateMedicineParams;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-med", post(create_med))
        .route("/med-taken", patch(med_taken))
        .route("/getMedicines", get(get_medicines))
        .route("/medicine-names/:user_id", get(medicine_names))
        .route("/users-by-medicine/:name", get(users_by_medicine))
}

// ---- Request / response shapes ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedRequest {
    pub user_id: i64,
    pub dosage_type: String,
    pub med_amount: StringOrNumber,
    pub med_name: String,
    /// Weeks.
    pub duration: i64,
    pub scheduled_time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedResponse {
    pub message: &'static str,
    pub medicine_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedTakenRequest {
    pub user_id: i64,
    pub medicine_id: i64,
    pub set_true_for_date: String,
    pub set_true: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMedicinesRequest {
    pub user_id: i64,
}

// ---- Handlers ----

/// `POST /api/user/create-med`
pub async fn create_med(
    State(state): State<AppState>,
    payload: Result<Json<CreateMedRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateMedResponse>), ApiError> {
    let Json(body) = payload?;
    require("medName", &body.med_name)?;
    require("dosageType", &body.dosage_type)?;

    let user_id = body.user_id;
    // Unknown owners are rejected before anything is stored.
    state.accounts.user_details(user_id).await?;

    let medicine = state
        .medicines
        .create_medicine(CreateMedicineParams {
            user_id,
            name: body.med_name,
            dosage_type: body.dosage_type,
            dosage_amount: body.med_amount.into_text(),
            duration_weeks: body.duration,
            scheduled_time: body.scheduled_time,
        })
        .await?;
    state.metrics.medicines_created_total.inc();

    state
        .accounts
        .link_medicine(user_id, medicine.id)
        .await
        .map_err(|err| {
            ApiError::Internal(format!(
                "Failed to link medicine {} to user {}: {}",
                medicine.id, user_id, err
            ))
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateMedResponse {
            message: "Medicine created successfully",
            medicine_id: medicine.id,
        }),
    ))
}

/// `PATCH /api/user/med-taken`
pub async fn med_taken(
    State(state): State<AppState>,
    payload: Result<Json<MedTakenRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;

    state
        .medicines
        .mark_completion_on(
            body.user_id,
            body.medicine_id,
            &body.set_true_for_date,
            body.set_true,
        )
        .await?;
    state.metrics.completions_marked_total.inc();

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/user/getMedicines`. `204` when the user has none.
pub async fn get_medicines(
    State(state): State<AppState>,
    payload: Result<Json<GetMedicinesRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) =
        payload.map_err(|rejection| ApiError::Unprocessable(rejection.body_text()))?;

    let medicines = state.medicines.list_medicines_for_user(body.user_id).await?;
    if medicines.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Ok(Json(medicines).into_response())
}

/// `GET /api/user/medicine-names/:user_id`
pub async fn medicine_names(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.medicines.list_medicine_names_for_user(user_id).await?))
}

/// `GET /api/user/users-by-medicine/:name`
pub async fn users_by_medicine(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<i64>>, ApiError> {
    Ok(Json(state.medicines.list_users_by_medicine_name(&name).await?))
}
