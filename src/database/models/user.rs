use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

/// Identity record. `password_hash` is absent for accounts created through a
/// federated sign-in; those are email-verified by policy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub email_verified: bool,
    pub email_verification_token: Option<String>,
    pub email_verification_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Client-facing projection. Never exposes the password hash or the
    /// verification token.
    pub fn summary(&self) -> Value {
        json!({
            "id": self.id,
            "email": self.email,
            "name": self.name,
            "emailVerified": self.email_verified,
        })
    }
}
