//! Application page endpoints. Rendering is the frontend's job; these return
//! the page identity so gating behavior (pass, redirect) is observable and
//! testable against the HTTP surface alone.

use axum::Extension;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, AuthUser};

pub async fn login() -> ApiResponse<Value> {
    ApiResponse::success(json!({ "page": "login" }))
}

pub async fn dashboard(Extension(auth): Extension<AuthUser>) -> ApiResponse<Value> {
    ApiResponse::success(json!({ "page": "dashboard", "userId": auth.user_id }))
}

pub async fn onboarding(Extension(auth): Extension<AuthUser>) -> ApiResponse<Value> {
    ApiResponse::success(json!({ "page": "onboarding", "userId": auth.user_id }))
}

pub async fn verify_email(Extension(auth): Extension<AuthUser>) -> ApiResponse<Value> {
    ApiResponse::success(json!({ "page": "verify-email", "userId": auth.user_id }))
}
