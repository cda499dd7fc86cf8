use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::repositories::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::mailer::{spawn_verification_email, Mailer};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

/// Opaque single-use verification token: random UUID plus a timestamp,
/// hashed so the emailed value carries no structure.
fn new_verification_token() -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    format!("{:x}", hasher.finalize())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// POST /auth/register
pub async fn register(ApiJson(payload): ApiJson<RegisterRequest>) -> ApiResult<Value> {
    if !is_plausible_email(&payload.email) {
        return Err(ApiError::invalid_field("email", "must be a valid email address"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::invalid_field(
            "password",
            "must be at least 8 characters",
        ));
    }

    let users = UserRepository::new().await?;

    // UX pre-check; the unique constraint still decides under races.
    if users.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::conflict("User already exists"));
    }

    let cost = config::config().security.bcrypt_cost;
    let password_hash = bcrypt::hash(&payload.password, cost).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Failed to create account")
    })?;

    let token = new_verification_token();
    let expires = Utc::now()
        + Duration::hours(config::config().security.verification_token_expiry_hours as i64);

    let user = users
        .create(
            &payload.email,
            Some(&password_hash),
            payload.name.as_deref(),
            Some(&token),
            Some(expires),
        )
        .await?;

    // Account creation never waits on the mailer.
    spawn_verification_email(user.email.clone(), token, user.name.clone());

    info!("Registered user {} ({})", user.id, user.email);
    Ok(ApiResponse::success(json!({
        "message": "User registered. Please verify your email.",
        "user": user.summary(),
    })))
}

/// POST /auth/login
pub async fn login(ApiJson(payload): ApiJson<LoginRequest>) -> ApiResult<Value> {
    let users = UserRepository::new().await?;

    // Unknown email, federated account and wrong password all collapse to
    // the same 401 so the endpoint leaks nothing about which accounts exist.
    let user = users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let matches = bcrypt::verify(&payload.password, hash).map_err(|e| {
        tracing::error!("Password verification failed: {}", e);
        ApiError::internal_server_error("Failed to verify credentials")
    })?;
    if !matches {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    // Correct password but unverified email is a distinct, actionable state.
    if !user.email_verified {
        return Err(ApiError::forbidden("Email not verified"));
    }

    let token = generate_jwt(Claims::new(user.id, user.email.clone()))?;

    Ok(ApiResponse::success(json!({
        "user": user.summary(),
        "token": token,
    })))
}

/// POST /auth/verify-email
pub async fn verify_email(ApiJson(payload): ApiJson<VerifyEmailRequest>) -> ApiResult<Value> {
    let users = UserRepository::new().await?;

    let user = users
        .find_by_verification_token(&payload.token)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid or expired verification token"))?;

    let expired = user
        .email_verification_expires
        .map(|expires| expires < Utc::now())
        .unwrap_or(true);
    if expired {
        return Err(ApiError::bad_request("Invalid or expired verification token"));
    }

    users.mark_verified(user.id).await?;
    info!("Email verified for user {}", user.id);

    Ok(ApiResponse::success(json!({
        "message": "Email verified successfully",
    })))
}

/// POST /auth/resend-verification
pub async fn resend_verification(
    ApiJson(payload): ApiJson<ResendVerificationRequest>,
) -> ApiResult<Value> {
    let users = UserRepository::new().await?;

    let user = users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.email_verified {
        return Err(ApiError::bad_request("Email is already verified"));
    }

    let token = new_verification_token();
    let expires = Utc::now()
        + Duration::hours(config::config().security.verification_token_expiry_hours as i64);
    users.rotate_verification_token(user.id, &token, expires).await?;

    // Explicit resend is the one place a mailer failure surfaces to the
    // client; the user asked for this exact email.
    let mailer = Mailer::new();
    if let Err(e) = mailer
        .send_verification_email(&user.email, &token, user.name.as_deref())
        .await
    {
        warn!("Resend verification failed for {}: {}", user.email, e);
        return Err(ApiError::bad_gateway("Failed to send verification email"));
    }

    Ok(ApiResponse::success(json!({
        "message": "Verification email sent",
    })))
}
