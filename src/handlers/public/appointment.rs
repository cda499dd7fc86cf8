use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::CustomerData;
use crate::database::repositories::{AppointmentRepository, BusinessRepository};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub business_id: i64,
    pub customer_data: CustomerData,
    pub appointment_time: String,
    pub service_name: Option<String>,
    pub notes: Option<String>,
}

/// POST /appointments
///
/// Unauthenticated booking from the chatbot widget. The business must exist;
/// everything else about double-booking is deliberately not enforced here.
pub async fn create(ApiJson(payload): ApiJson<CreateAppointmentRequest>) -> ApiResult<Value> {
    if payload.customer_data.name.trim().is_empty() {
        return Err(ApiError::invalid_field(
            "customerData.name",
            "customer name is required",
        ));
    }

    let appointment_time = DateTime::parse_from_rfc3339(&payload.appointment_time)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| {
            ApiError::invalid_field("appointmentTime", "must be an RFC 3339 timestamp")
        })?;

    let businesses = BusinessRepository::new().await?;
    if businesses.find_by_id(payload.business_id).await?.is_none() {
        return Err(ApiError::not_found("Business not found"));
    }

    let appointments = AppointmentRepository::new().await?;
    let appointment = appointments
        .create(
            payload.business_id,
            payload.customer_data,
            appointment_time,
            payload.service_name.as_deref(),
            payload.notes.as_deref(),
        )
        .await?;

    info!(
        "Appointment {} booked for business {}",
        appointment.id, appointment.business_id
    );
    Ok(ApiResponse::created(json!({ "appointment": appointment })))
}
