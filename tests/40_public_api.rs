mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn check_subdomain_rejects_invalid_syntax() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for bad in ["ab", "UPPER", "has_underscore"] {
        let res = client
            .get(format!(
                "{}/businesses/check-subdomain/{}",
                server.base_url, bad
            ))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "slug {}", bad);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
    Ok(())
}

#[tokio::test]
async fn chatbot_view_requires_subdomain_parameter() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/chatbot", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn booking_rejects_malformed_timestamp() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/appointments", server.base_url))
        .json(&json!({
            "businessId": 1,
            "customerData": { "name": "Ana" },
            "appointmentTime": "tomorrow at noon"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["field_errors"]["appointmentTime"].is_string());
    Ok(())
}

#[tokio::test]
async fn booking_rejects_blank_customer_name() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/appointments", server.base_url))
        .json(&json!({
            "businessId": 1,
            "customerData": { "name": "   " },
            "appointmentTime": "2026-09-01T10:00:00Z"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn chat_always_answers_in_chat_shape() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // With no NLP backend running this is the degraded path; with one it is
    // the happy path. Either way the body must be chat-shaped.
    let res = client
        .post(format!("{}/chat/1/message", server.base_url))
        .json(&json!({ "message": "hola", "sessionId": "s-1" }))
        .send()
        .await?;

    assert!(
        res.status() == StatusCode::OK || res.status() == StatusCode::BAD_GATEWAY,
        "unexpected status: {}",
        res.status()
    );
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["data"]["botResponse"].is_string());
    Ok(())
}
