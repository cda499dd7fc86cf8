use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::database::repositories::{BusinessRepository, UserRepository};
use crate::error::ApiError;

use super::auth::resolve_identity;

/// Where unauthenticated or failed-lookup requests land. Access is never
/// granted on a gate failure.
const LOGIN_PATH: &str = "/login";

/// Derived onboarding state. Computed per request from two stored facts and
/// never persisted, so it cannot drift from what it is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingState {
    /// Email not yet verified
    Unverified,
    /// Verified but owns no business yet
    PendingOnboarding,
    /// Verified with at least one business
    Active,
}

impl OnboardingState {
    pub fn derive(email_verified: bool, has_business: bool) -> Self {
        match (email_verified, has_business) {
            (false, _) => OnboardingState::Unverified,
            (true, false) => OnboardingState::PendingOnboarding,
            (true, true) => OnboardingState::Active,
        }
    }
}

/// Protected browser areas the gate arbitrates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateArea {
    Verification,
    Onboarding,
    Dashboard,
}

impl GateArea {
    pub fn from_path(path: &str) -> Option<Self> {
        if path == "/verify-email" || path.starts_with("/verify-email/") {
            Some(GateArea::Verification)
        } else if path == "/onboarding" || path.starts_with("/onboarding/") {
            Some(GateArea::Onboarding)
        } else if path == "/dashboard" || path.starts_with("/dashboard/") {
            Some(GateArea::Dashboard)
        } else {
            None
        }
    }
}

/// The redirect table. `None` means the request may proceed.
///
/// Transitions are one-directional: an unverified caller is pushed to the
/// verification flow, a verified-but-businessless caller to the wizard, and
/// a fully active caller re-entering the wizard is bounced back to the
/// dashboard (idempotent re-entry guard).
pub fn redirect_target(state: OnboardingState, area: GateArea) -> Option<&'static str> {
    match (state, area) {
        (OnboardingState::Unverified, GateArea::Verification) => None,
        (OnboardingState::Unverified, _) => Some("/verify-email"),
        (OnboardingState::PendingOnboarding, GateArea::Dashboard) => Some("/onboarding"),
        (OnboardingState::Active, GateArea::Onboarding) => Some("/dashboard"),
        _ => None,
    }
}

/// Onboarding state gate for browser-area routes. Tenant chatbot traffic
/// never reaches this layer; it was already rewritten to the public view.
pub async fn onboarding_gate(mut request: Request, next: Next) -> Response {
    let area = match GateArea::from_path(request.uri().path()) {
        Some(area) => area,
        None => return next.run(request).await,
    };

    // No identity on a protected path: straight to login, no state lookup.
    let identity = match resolve_identity(request.headers()).await {
        Ok(identity) => identity,
        Err(_) => return Redirect::to(LOGIN_PATH).into_response(),
    };

    // Fail closed: a lookup error redirects to login rather than granting
    // access with an unknown state.
    let state = match lookup_state(identity.user_id).await {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(
                "Onboarding gate lookup failed for user {}: {}; failing closed",
                identity.user_id,
                e
            );
            return Redirect::to(LOGIN_PATH).into_response();
        }
    };

    match redirect_target(state, area) {
        Some(target) => Redirect::to(target).into_response(),
        None => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
    }
}

async fn lookup_state(user_id: i64) -> Result<OnboardingState, ApiError> {
    let users = UserRepository::new().await?;
    let user = users
        .find_by_id(user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    let businesses = BusinessRepository::new().await?;
    let has_business = businesses
        .owner_has_any(user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(OnboardingState::derive(user.email_verified, has_business))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_a_pure_function_of_two_facts() {
        assert_eq!(OnboardingState::derive(false, false), OnboardingState::Unverified);
        // a business without a verified email still counts as unverified
        assert_eq!(OnboardingState::derive(false, true), OnboardingState::Unverified);
        assert_eq!(
            OnboardingState::derive(true, false),
            OnboardingState::PendingOnboarding
        );
        assert_eq!(OnboardingState::derive(true, true), OnboardingState::Active);
    }

    #[test]
    fn unverified_callers_are_pushed_to_verification() {
        let state = OnboardingState::Unverified;
        assert_eq!(redirect_target(state, GateArea::Dashboard), Some("/verify-email"));
        assert_eq!(redirect_target(state, GateArea::Onboarding), Some("/verify-email"));
        // the verification flow itself stays reachable
        assert_eq!(redirect_target(state, GateArea::Verification), None);
    }

    #[test]
    fn pending_callers_are_pushed_to_the_wizard() {
        let state = OnboardingState::PendingOnboarding;
        assert_eq!(redirect_target(state, GateArea::Dashboard), Some("/onboarding"));
        assert_eq!(redirect_target(state, GateArea::Onboarding), None);
        assert_eq!(redirect_target(state, GateArea::Verification), None);
    }

    #[test]
    fn active_callers_bounce_off_the_wizard() {
        let state = OnboardingState::Active;
        assert_eq!(redirect_target(state, GateArea::Onboarding), Some("/dashboard"));
        assert_eq!(redirect_target(state, GateArea::Dashboard), None);
        assert_eq!(redirect_target(state, GateArea::Verification), None);
    }

    #[test]
    fn gate_areas_match_on_path_prefixes() {
        assert_eq!(GateArea::from_path("/dashboard"), Some(GateArea::Dashboard));
        assert_eq!(
            GateArea::from_path("/dashboard/appointments"),
            Some(GateArea::Dashboard)
        );
        assert_eq!(GateArea::from_path("/onboarding"), Some(GateArea::Onboarding));
        assert_eq!(
            GateArea::from_path("/verify-email/abc123"),
            Some(GateArea::Verification)
        );
        assert_eq!(GateArea::from_path("/dashboardx"), None);
        assert_eq!(GateArea::from_path("/"), None);
    }
}
