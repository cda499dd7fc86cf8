use axum::Extension;
use serde_json::{json, Value};

use crate::database::repositories::{BusinessRepository, UserRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /user/status
///
/// The two facts the frontend derives its gating from. Onboarding completion
/// is not a stored flag; it is "owns at least one business".
pub async fn status(Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    let users = UserRepository::new().await?;
    let user = users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let businesses = BusinessRepository::new().await?;
    let has_business = businesses.owner_has_any(auth.user_id).await?;

    Ok(ApiResponse::success(json!({
        "emailVerified": user.email_verified,
        "hasCompletedOnboarding": has_business,
    })))
}
