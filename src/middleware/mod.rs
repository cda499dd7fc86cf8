pub mod auth;
pub mod onboarding;
pub mod response;
pub mod subdomain;

pub use auth::{auth_middleware, resolve_identity, AuthUser};
pub use onboarding::{onboarding_gate, OnboardingState};
pub use response::{ApiJson, ApiResponse, ApiResult};
pub use subdomain::{subdomain_rewrite, tenant_slug};
