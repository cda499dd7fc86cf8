//! Database-backed lifecycle tests. These drive the real HTTP surface end to
//! end and are skipped when DATABASE_URL is not set, so the rest of the suite
//! stays runnable without infrastructure.

mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn database_configured() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

struct Owner {
    user_id: i64,
    email: String,
}

/// Register a fresh account. The delegated identity headers are accepted for
/// the protected surface once the row exists, so no login/verification dance
/// is needed here.
async fn register_owner(client: &reqwest::Client, base_url: &str) -> Result<Owner> {
    let email = format!("{}@example.com", unique("owner"));
    let res = client
        .post(format!("{}/auth/register", base_url))
        .json(&json!({ "email": email, "password": "long-enough-pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK, "register failed");

    let body = res.json::<Value>().await?;
    let user_id = body["data"]["user"]["id"]
        .as_i64()
        .context("register response missing user id")?;
    Ok(Owner { user_id, email })
}

async fn create_business(
    client: &reqwest::Client,
    base_url: &str,
    owner: &Owner,
    slug: &str,
) -> Result<reqwest::Response> {
    Ok(client
        .post(format!("{}/businesses", base_url))
        .header("x-user-id", owner.user_id.to_string())
        .header("x-user-email", &owner.email)
        .json(&json!({
            "name": "Corte y Color",
            "subdomain": slug,
            "appointmentConfig": { "services": [] },
        }))
        .send()
        .await?)
}

async fn book_appointment(
    client: &reqwest::Client,
    base_url: &str,
    business_id: i64,
) -> Result<i64> {
    let res = client
        .post(format!("{}/appointments", base_url))
        .json(&json!({
            "businessId": business_id,
            "customerData": { "name": "Ana" },
            "appointmentTime": "2030-06-01T10:00:00Z",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED, "booking failed");

    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["appointment"]["status"], "pending");
    body["data"]["appointment"]["id"]
        .as_i64()
        .context("booking response missing appointment id")
}

async fn transition(
    client: &reqwest::Client,
    base_url: &str,
    owner: &Owner,
    business_id: i64,
    appointment_id: i64,
    action: &str,
) -> Result<reqwest::Response> {
    Ok(client
        .post(format!(
            "{}/appointments/{}/{}",
            base_url, business_id, action
        ))
        .header("x-user-id", owner.user_id.to_string())
        .header("x-user-email", &owner.email)
        .json(&json!({ "appointmentId": appointment_id }))
        .send()
        .await?)
}

#[tokio::test]
async fn appointment_leaves_pending_exactly_once() -> Result<()> {
    if !database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let owner = register_owner(&client, &server.base_url).await?;
    let res = create_business(&client, &server.base_url, &owner, &unique("shop")).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let business_id = res.json::<Value>().await?["data"]["business"]["id"]
        .as_i64()
        .context("create response missing business id")?;

    let appointment_id = book_appointment(&client, &server.base_url, business_id).await?;

    // First confirm wins
    let res = transition(
        &client,
        &server.base_url,
        &owner,
        business_id,
        appointment_id,
        "confirm",
    )
    .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["appointment"]["status"], "confirmed");

    // Re-confirm and cancel both target a terminal appointment now
    for action in ["confirm", "cancel"] {
        let res = transition(
            &client,
            &server.base_url,
            &owner,
            business_id,
            appointment_id,
            action,
        )
        .await?;
        assert_eq!(
            res.status(),
            StatusCode::NOT_FOUND,
            "{} after terminal state should be 404",
            action
        );
    }
    Ok(())
}

#[tokio::test]
async fn concurrent_confirm_and_cancel_settle_deterministically() -> Result<()> {
    if !database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let owner = register_owner(&client, &server.base_url).await?;
    let res = create_business(&client, &server.base_url, &owner, &unique("shop")).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let business_id = res.json::<Value>().await?["data"]["business"]["id"]
        .as_i64()
        .context("create response missing business id")?;

    let appointment_id = book_appointment(&client, &server.base_url, business_id).await?;

    // Two operator tabs race; the status precondition lets exactly one win
    let (confirm, cancel) = tokio::join!(
        transition(
            &client,
            &server.base_url,
            &owner,
            business_id,
            appointment_id,
            "confirm",
        ),
        transition(
            &client,
            &server.base_url,
            &owner,
            business_id,
            appointment_id,
            "cancel",
        ),
    );
    let statuses = [confirm?.status(), cancel?.status()];
    let wins = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let losses = statuses
        .iter()
        .filter(|s| **s == StatusCode::NOT_FOUND)
        .count();
    assert_eq!((wins, losses), (1, 1), "statuses: {:?}", statuses);
    Ok(())
}

#[tokio::test]
async fn duplicate_slug_claim_is_a_conflict() -> Result<()> {
    if !database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let owner = register_owner(&client, &server.base_url).await?;
    let slug = unique("shop");

    let res = create_business(&client, &server.base_url, &owner, &slug).await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = create_business(&client, &server.base_url, &owner, &slug).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn booking_against_missing_business_is_not_found() -> Result<()> {
    if !database_configured() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/appointments", server.base_url))
        .json(&json!({
            "businessId": 1_000_000_000_i64,
            "customerData": { "name": "Ana" },
            "appointmentTime": "2030-06-01T10:00:00Z",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
