use axum::Extension;
use serde_json::{json, Value};

use crate::database::repositories::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /auth/me
///
/// Fresh read rather than echoing token claims, so a verification that
/// happened after login is visible immediately.
pub async fn me(Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    let users = UserRepository::new().await?;
    let user = users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(json!({ "user": user.summary() })))
}
