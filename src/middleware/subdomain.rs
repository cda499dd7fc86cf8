use axum::{extract::Request, http::header::HOST, middleware::Next, response::Response};

use crate::config;

/// Extract a tenant slug from a request Host header.
///
/// A host denotes a tenant when it ends with the platform root domain, is not
/// the bare root itself, and its leftmost label is not the reserved `www`.
/// The leftmost label is the slug; whether it resolves to a business is the
/// directory's problem, not routing's.
pub fn tenant_slug(host: &str, root_domain: &str) -> Option<String> {
    let host = host.split(':').next().unwrap_or(host); // strip port
    if host == root_domain {
        return None;
    }
    let labels = host.strip_suffix(root_domain)?.strip_suffix('.')?;
    let slug = labels.split('.').next()?;
    if slug.is_empty() || slug == "www" {
        return None;
    }
    Some(slug.to_string())
}

/// Paths served as API endpoints, exempt from the hosting-layer rewrite.
fn is_api_path(path: &str) -> bool {
    const API_PREFIXES: [&str; 7] = [
        "/health",
        "/auth",
        "/businesses",
        "/appointments",
        "/chat",
        "/user",
        "/chatbot",
    ];
    API_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Tenant resolver. Runs outermost, before any authentication or gating:
/// tenant-subdomain requests are rewritten to the public chatbot view with
/// the slug as an explicit parameter and never see the onboarding gate.
pub async fn subdomain_rewrite(mut request: Request, next: Next) -> Response {
    let root_domain = &config::config().platform.root_domain;

    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    if !is_api_path(request.uri().path()) {
        if let Some(slug) = tenant_slug(host, root_domain) {
            let rewritten = format!("/chatbot?subdomain={}", slug);
            if let Ok(uri) = rewritten.parse() {
                tracing::debug!("Rewriting tenant request for '{}' to {}", host, rewritten);
                *request.uri_mut() = uri;
            }
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "clonchat.com";

    #[test]
    fn extracts_leftmost_label_as_slug() {
        assert_eq!(tenant_slug("acme.clonchat.com", ROOT), Some("acme".to_string()));
        assert_eq!(
            tenant_slug("barber-shop2.clonchat.com", ROOT),
            Some("barber-shop2".to_string())
        );
        // nested labels: leftmost wins
        assert_eq!(
            tenant_slug("a.b.clonchat.com", ROOT),
            Some("a".to_string())
        );
    }

    #[test]
    fn bare_root_and_www_never_rewrite() {
        assert_eq!(tenant_slug("clonchat.com", ROOT), None);
        assert_eq!(tenant_slug("www.clonchat.com", ROOT), None);
    }

    #[test]
    fn foreign_hosts_pass_through() {
        assert_eq!(tenant_slug("example.com", ROOT), None);
        assert_eq!(tenant_slug("acme.example.com", ROOT), None);
        // suffix match must be on a label boundary
        assert_eq!(tenant_slug("evilclonchat.com", ROOT), None);
        assert_eq!(tenant_slug("localhost", ROOT), None);
        assert_eq!(tenant_slug("", ROOT), None);
    }

    #[test]
    fn ports_are_stripped_before_matching() {
        assert_eq!(
            tenant_slug("acme.clonchat.com:3000", ROOT),
            Some("acme".to_string())
        );
        assert_eq!(tenant_slug("clonchat.com:443", ROOT), None);
    }

    #[test]
    fn api_paths_are_exempt() {
        assert!(is_api_path("/health"));
        assert!(is_api_path("/businesses/check-subdomain/acme"));
        assert!(is_api_path("/chatbot"));
        assert!(!is_api_path("/"));
        assert!(!is_api_path("/dashboard"));
        assert!(!is_api_path("/some/page"));
    }
}
