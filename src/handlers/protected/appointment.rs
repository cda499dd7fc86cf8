use axum::extract::Path;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::AppointmentStatus;
use crate::database::repositories::{AppointmentRepository, BusinessRepository};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub appointment_id: i64,
}

/// GET /appointments/:business_id
pub async fn list(
    Extension(auth): Extension<AuthUser>,
    Path(business_id): Path<i64>,
) -> ApiResult<Value> {
    let businesses = BusinessRepository::new().await?;
    let business = businesses
        .find_by_id(business_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Business not found"))?;
    if business.user_id != auth.user_id {
        return Err(ApiError::forbidden("Forbidden"));
    }

    let appointments = AppointmentRepository::new().await?;
    let rows = appointments.list_for_business(business_id).await?;
    Ok(ApiResponse::success(json!({ "appointments": rows })))
}

/// POST /appointments/:business_id/confirm
pub async fn confirm(
    Extension(auth): Extension<AuthUser>,
    Path(business_id): Path<i64>,
    ApiJson(payload): ApiJson<TransitionRequest>,
) -> ApiResult<Value> {
    transition(
        auth,
        business_id,
        payload.appointment_id,
        AppointmentStatus::Confirmed,
    )
    .await
}

/// POST /appointments/:business_id/cancel
pub async fn cancel(
    Extension(auth): Extension<AuthUser>,
    Path(business_id): Path<i64>,
    ApiJson(payload): ApiJson<TransitionRequest>,
) -> ApiResult<Value> {
    transition(
        auth,
        business_id,
        payload.appointment_id,
        AppointmentStatus::Cancelled,
    )
    .await
}

/// A missing or foreign business is one 403: write paths do not distinguish
/// "no such business" from "not yours". The conditional update returning no
/// row (wrong business, unknown id, or already transitioned) is a 404.
async fn transition(
    auth: AuthUser,
    business_id: i64,
    appointment_id: i64,
    to: AppointmentStatus,
) -> ApiResult<Value> {
    let businesses = BusinessRepository::new().await?;
    let owned = businesses
        .find_by_id(business_id)
        .await?
        .map(|b| b.user_id == auth.user_id)
        .unwrap_or(false);
    if !owned {
        return Err(ApiError::forbidden("Forbidden"));
    }

    let appointments = AppointmentRepository::new().await?;
    let appointment = appointments
        .transition(appointment_id, business_id, to)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment not found"))?;

    info!(
        "Appointment {} -> {} by user {}",
        appointment.id, to, auth.user_id
    );
    Ok(ApiResponse::success(json!({ "appointment": appointment })))
}
