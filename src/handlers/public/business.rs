use axum::extract::{Path, Query};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::PublicBusiness;
use crate::database::repositories::{is_valid_slug, BusinessRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /businesses/check-subdomain/:subdomain
///
/// Availability probe for the onboarding wizard. A syntactically invalid
/// slug is a 400, not "unavailable": the wizard should fix the input rather
/// than suggest alternatives.
pub async fn check_subdomain(Path(subdomain): Path<String>) -> ApiResult<Value> {
    if !is_valid_slug(&subdomain) {
        return Err(ApiError::invalid_field(
            "subdomain",
            "must be 3-50 lowercase letters, digits or hyphens",
        ));
    }

    let businesses = BusinessRepository::new().await?;
    let taken = businesses.subdomain_taken(&subdomain).await?;

    Ok(ApiResponse::success(json!({
        "subdomain": subdomain,
        "available": !taken,
    })))
}

/// GET /businesses/subdomain/:subdomain
///
/// Public tenant lookup used by the chatbot widget. Returns the redacted
/// projection, never the owner linkage.
pub async fn get_by_subdomain(Path(subdomain): Path<String>) -> ApiResult<Value> {
    let businesses = BusinessRepository::new().await?;
    let business = businesses
        .find_by_subdomain(&subdomain)
        .await?
        .ok_or_else(|| ApiError::not_found("Business not found"))?;

    Ok(ApiResponse::success(json!({
        "business": PublicBusiness::from(business),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ChatbotViewQuery {
    pub subdomain: Option<String>,
}

/// GET /chatbot?subdomain=slug
///
/// Target of the host-based rewrite: a request for acme.<root domain>/
/// lands here with subdomain=acme. Serves the widget bootstrap payload.
pub async fn chatbot_view(Query(query): Query<ChatbotViewQuery>) -> ApiResult<Value> {
    let subdomain = query
        .subdomain
        .ok_or_else(|| ApiError::bad_request("Missing subdomain parameter"))?;

    let businesses = BusinessRepository::new().await?;
    let business = businesses
        .find_by_subdomain(&subdomain)
        .await?
        .ok_or_else(|| ApiError::not_found("Business not found"))?;

    Ok(ApiResponse::success(json!({
        "page": "chatbot",
        "business": PublicBusiness::from(business),
    })))
}
