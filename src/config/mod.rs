use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub platform: PlatformConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

/// Hostname-level routing facts: which domain tenant subdomains hang off,
/// and where the browser frontend lives (used in verification links).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub root_domain: String,
    pub frontend_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub verification_token_expiry_hours: u64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub chatbot_url: String,
    /// HTTP endpoint of the mail-sending collaborator. None disables outbound
    /// mail entirely (useful for local development without a mailer).
    pub mailer_url: Option<String>,
    pub mail_from: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("ROOT_DOMAIN") {
            self.platform.root_domain = v;
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            self.platform.frontend_url = v;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("CHATBOT_URL") {
            self.upstream.chatbot_url = v;
        }
        if let Ok(v) = env::var("MAILER_URL") {
            self.upstream.mailer_url = Some(v);
        }
        if let Ok(v) = env::var("MAIL_FROM") {
            self.upstream.mail_from = v;
        }

        // The signing secret is process-wide and immutable after load. In
        // production a missing secret is a boot failure, not a fallback.
        if self.environment == Environment::Production && self.security.jwt_secret.is_empty() {
            panic!("JWT_SECRET must be set when APP_ENV=production");
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            platform: PlatformConfig {
                root_domain: "clonchat.com".to_string(),
                frontend_url: "http://localhost:3000".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-in-production".to_string(),
                jwt_expiry_hours: 24 * 7,
                verification_token_expiry_hours: 24,
                bcrypt_cost: 10,
            },
            database: DatabaseConfig { max_connections: 10 },
            upstream: UpstreamConfig {
                chatbot_url: "http://localhost:8000".to_string(),
                mailer_url: None,
                mail_from: "Clonchat <no-reply@clonchat.com>".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            platform: PlatformConfig {
                root_domain: "clonchat.com".to_string(),
                frontend_url: "https://clonchat.com".to_string(),
            },
            security: SecurityConfig {
                // Must come from JWT_SECRET; empty triggers the boot check.
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                verification_token_expiry_hours: 24,
                bcrypt_cost: 12,
            },
            database: DatabaseConfig { max_connections: 50 },
            upstream: UpstreamConfig {
                chatbot_url: "http://chatbot:8000".to_string(),
                mailer_url: None,
                mail_from: "Clonchat <no-reply@clonchat.com>".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
