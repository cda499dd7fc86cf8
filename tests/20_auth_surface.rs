mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_rejects_implausible_email() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({ "email": "not-an-email", "password": "longenough" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["email"].is_string());
    Ok(())
}

#[tokio::test]
async fn register_rejects_short_password() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({ "email": "a@example.com", "password": "short" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["field_errors"]["password"].is_string());
    Ok(())
}

#[tokio::test]
async fn malformed_json_bodies_use_the_error_envelope() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    assert_eq!(body["error"], true);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_credentials() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for (method, path) in [
        (reqwest::Method::GET, "/auth/me"),
        (reqwest::Method::GET, "/user/status"),
        (reqwest::Method::GET, "/businesses"),
        (reqwest::Method::PUT, "/businesses/1"),
        (reqwest::Method::DELETE, "/businesses/1"),
        (reqwest::Method::GET, "/appointments/1"),
        (reqwest::Method::POST, "/appointments/1/confirm"),
        (reqwest::Method::POST, "/appointments/1/cancel"),
    ] {
        let res = client
            .request(method.clone(), format!("{}{}", server.base_url, path))
            .send()
            .await?;
        assert_eq!(
            res.status(),
            StatusCode::UNAUTHORIZED,
            "{} {} should be 401 without credentials",
            method,
            path
        );
    }
    Ok(())
}

#[tokio::test]
async fn malformed_bearer_tokens_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/auth/me", server.base_url))
        .header("authorization", "Bearer not.a.jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/auth/me", server.base_url))
        .header("authorization", "Token abc")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
