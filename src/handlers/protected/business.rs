use axum::extract::Path;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::types::Json as SqlJson;
use tracing::info;

use crate::database::models::{AppointmentConfig, AvailabilityDay, Business, VisualConfig};
use crate::database::repositories::{is_valid_slug, BusinessRepository, NewBusiness};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessRequest {
    pub name: String,
    pub description: Option<String>,
    pub subdomain: String,
    pub visual_config: Option<VisualConfig>,
    pub appointment_config: AppointmentConfig,
    pub availability: Option<Vec<AvailabilityDay>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBusinessRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub subdomain: Option<String>,
    pub visual_config: Option<VisualConfig>,
    pub appointment_config: Option<AppointmentConfig>,
    pub availability: Option<Vec<AvailabilityDay>>,
}

fn validate_availability(days: &[AvailabilityDay]) -> Result<(), ApiError> {
    for day in days {
        day.validate()
            .map_err(|reason| ApiError::invalid_field("availability", reason))?;
    }
    Ok(())
}

/// Load a business and prove the caller owns it. Missing row is 404; a row
/// owned by someone else is 403, the id was valid after all.
async fn load_owned(
    repo: &BusinessRepository,
    business_id: i64,
    auth: &AuthUser,
) -> Result<Business, ApiError> {
    let business = repo
        .find_by_id(business_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Business not found"))?;
    if business.user_id != auth.user_id {
        return Err(ApiError::forbidden("Forbidden"));
    }
    Ok(business)
}

/// GET /businesses
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    let businesses = BusinessRepository::new().await?;
    let rows = businesses.list_by_owner(auth.user_id).await?;
    Ok(ApiResponse::success(json!({ "businesses": rows })))
}

/// POST /businesses
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateBusinessRequest>,
) -> ApiResult<Value> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::invalid_field("name", "business name is required"));
    }
    if !is_valid_slug(&payload.subdomain) {
        return Err(ApiError::invalid_field(
            "subdomain",
            "must be 3-50 lowercase letters, digits or hyphens",
        ));
    }
    if let Some(days) = &payload.availability {
        validate_availability(days)?;
    }

    let businesses = BusinessRepository::new().await?;
    let business = businesses
        .create(
            auth.user_id,
            NewBusiness {
                name: payload.name,
                description: payload.description,
                subdomain: payload.subdomain,
                visual_config: payload.visual_config,
                appointment_config: payload.appointment_config,
                availability: payload.availability,
            },
        )
        .await?;

    info!(
        "Business {} ({}) created by user {}",
        business.id, business.subdomain, auth.user_id
    );
    Ok(ApiResponse::created(json!({ "business": business })))
}

/// PUT /businesses/:id
///
/// Partial update: absent fields keep their stored value. The merged row is
/// written back whole; a subdomain change re-enters the uniqueness race and
/// maps to 409 like creation does.
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(business_id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateBusinessRequest>,
) -> ApiResult<Value> {
    let businesses = BusinessRepository::new().await?;
    let mut business = load_owned(&businesses, business_id, &auth).await?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::invalid_field("name", "business name is required"));
        }
        business.name = name;
    }
    if let Some(description) = payload.description {
        business.description = Some(description);
    }
    if let Some(subdomain) = payload.subdomain {
        if !is_valid_slug(&subdomain) {
            return Err(ApiError::invalid_field(
                "subdomain",
                "must be 3-50 lowercase letters, digits or hyphens",
            ));
        }
        business.subdomain = subdomain;
    }
    if let Some(visual_config) = payload.visual_config {
        business.visual_config = Some(SqlJson(visual_config));
    }
    if let Some(appointment_config) = payload.appointment_config {
        business.appointment_config = SqlJson(appointment_config);
    }
    if let Some(availability) = payload.availability {
        validate_availability(&availability)?;
        business.availability = Some(SqlJson(availability));
    }

    let updated = businesses.update(&business).await?;
    Ok(ApiResponse::success(json!({ "business": updated })))
}

/// DELETE /businesses/:id
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(business_id): Path<i64>,
) -> ApiResult<Value> {
    let businesses = BusinessRepository::new().await?;
    let business = load_owned(&businesses, business_id, &auth).await?;

    businesses.delete(business.id).await?;
    info!(
        "Business {} ({}) deleted by user {}",
        business.id, business.subdomain, auth.user_id
    );
    Ok(ApiResponse::success(json!({
        "message": "Business deleted successfully",
    })))
}
