//! API integration tests
//!
//! Need a running server (and database); point `SHAREIT_TEST_URL` at the
//! gateway to exercise it instead.

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const SHARER_HEADER: &str = "X-Sharer-User-Id";

fn base_url() -> String {
    std::env::var("SHAREIT_TEST_URL").unwrap_or_else(|_| "http://localhost:9090".to_string())
}

/// Timestamp `secs` seconds from now in the wire format
fn at(secs: i64) -> String {
    (Utc::now().naive_utc() + ChronoDuration::seconds(secs))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Utc::now().timestamp_micros())
}

async fn create_user(client: &Client, name: &str) -> i64 {
    let response = client
        .post(format!("{}/users", base_url()))
        .json(&json!({ "name": name, "email": unique_email(name) }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

async fn create_item(client: &Client, owner: i64, available: bool) -> i64 {
    let response = client
        .post(format!("{}/items", base_url()))
        .header(SHARER_HEADER, owner)
        .json(&json!({
            "name": "Drill",
            "description": "Cordless drill with two batteries",
            "available": available
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

async fn book(client: &Client, booker: i64, item: i64, start: i64, end: i64) -> reqwest::Response {
    client
        .post(format!("{}/bookings", base_url()))
        .header(SHARER_HEADER, booker)
        .json(&json!({ "itemId": item, "start": at(start), "end": at(end) }))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_conflicts() {
    let client = Client::new();
    let email = unique_email("twin");

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let response = client
            .post(format!("{}/users", base_url()))
            .json(&json!({ "name": "Twin", "email": email }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
#[ignore]
async fn test_missing_sharer_header() {
    let client = Client::new();

    let response = client
        .get(format!("{}/items", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_unavailable_item_cannot_be_booked() {
    let client = Client::new();
    let owner = create_user(&client, "owner").await;
    let booker = create_user(&client, "booker").await;
    let item = create_item(&client, owner, false).await;

    let response = book(&client, booker, item, 3600, 7200).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_owner_cannot_book_own_item() {
    let client = Client::new();
    let owner = create_user(&client, "owner").await;
    let item = create_item(&client, owner, true).await;

    let response = book(&client, owner, item, 3600, 7200).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_unknown_state_filter() {
    let client = Client::new();
    let user = create_user(&client, "lister").await;

    let response = client
        .get(format!("{}/bookings?state=UNSUPPORTED_STATUS", base_url()))
        .header(SHARER_HEADER, user)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Unknown state: UNSUPPORTED_STATUS");
}

#[tokio::test]
#[ignore]
async fn test_booking_and_comment_flow() {
    let client = Client::new();
    let owner = create_user(&client, "owner").await;
    let booker = create_user(&client, "booker").await;
    let stranger = create_user(&client, "stranger").await;
    let item = create_item(&client, owner, true).await;

    // Short booking so the comment gate opens during the test
    let response = book(&client, booker, item, 2, 3).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let booking: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(booking["status"], "WAITING");
    let booking_id = booking["id"].as_i64().expect("No id in response");

    let response = client
        .get(format!("{}/bookings/{}", base_url(), booking_id))
        .header(SHARER_HEADER, stranger)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let decide = |approved: bool| {
        client
            .patch(format!("{}/bookings/{}?approved={}", base_url(), booking_id, approved))
            .header(SHARER_HEADER, owner)
            .send()
    };

    let response = decide(true).await.expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "APPROVED");

    let response = decide(false).await.expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let comment = |text: &'static str| {
        client
            .post(format!("{}/items/{}/comment", base_url(), item))
            .header(SHARER_HEADER, booker)
            .json(&json!({ "text": text }))
            .send()
    };

    let response = comment("Too early").await.expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    tokio::time::sleep(Duration::from_secs(5)).await;

    let response = comment("Worked great").await.expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .get(format!("{}/items/{}", base_url(), item))
        .header(SHARER_HEADER, owner)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["lastBooking"]["id"], booking_id);
    assert!(body["nextBooking"].is_null());
    assert_eq!(body["comments"][0]["text"], "Worked great");
}

#[tokio::test]
#[ignore]
async fn test_requests_pagination() {
    let client = Client::new();
    let requester = create_user(&client, "requester").await;
    let other = create_user(&client, "other").await;

    let response = client
        .post(format!("{}/requests", base_url()))
        .header(SHARER_HEADER, requester)
        .json(&json!({ "description": "Need a ladder" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .get(format!("{}/requests/all?from=0&size=50", base_url()))
        .header(SHARER_HEADER, other)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.as_array().is_some_and(|requests| !requests.is_empty()));

    let response = client
        .get(format!("{}/requests/all?from=-1&size=10", base_url()))
        .header(SHARER_HEADER, other)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
