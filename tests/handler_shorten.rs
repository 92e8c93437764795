mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::API_KEY;

#[tokio::test]
async fn test_shorten_requires_api_key() {
    let ctx = common::create_test_context();
    let server = common::test_server(&ctx);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), "Bearer");
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_shorten_rejects_unknown_key() {
    let ctx = common::create_test_context();
    let server = common::test_server(&ctx);

    let response = server
        .post("/api/shorten")
        .authorization_bearer("not-a-key")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_shorten_allocates_ending() {
    let ctx = common::create_test_context();
    let server = common::test_server(&ctx);

    let response = server
        .post("/api/shorten")
        .authorization_bearer(API_KEY)
        .json(&json!({ "url": "https://example.com/docs", "tags": ["team-a"] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    let ending = json["ending"].as_str().unwrap();
    assert_eq!(ending.len(), 8);
    assert_eq!(json["url"], "https://example.com/docs");
    assert_eq!(json["short_url"], format!("{}/{}", common::BASE_URL, ending));
    assert_eq!(json["tags"], json!(["team-a"]));
    assert!(json["creation_time"].is_string());
}

#[tokio::test]
async fn test_shorten_with_manual_ending() {
    let ctx = common::create_test_context();
    let server = common::test_server(&ctx);

    let response = server
        .post("/api/shorten")
        .authorization_bearer(API_KEY)
        .json(&json!({ "url": "https://example.com", "ending": "rust-docs" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["ending"], "RUST-DOCS");
}

#[tokio::test]
async fn test_shorten_taken_ending_conflicts() {
    let ctx = common::create_test_context();
    let server = common::test_server(&ctx);

    server
        .post("/api/shorten")
        .authorization_bearer(API_KEY)
        .json(&json!({ "url": "https://a.example.com", "ending": "promo" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/shorten")
        .authorization_bearer(API_KEY)
        .json(&json!({ "url": "https://b.example.com", "ending": "Promo" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "conflict");
    assert_eq!(json["error"]["details"]["ending"], "Promo");
}

#[tokio::test]
async fn test_shorten_rejects_invalid_input() {
    let ctx = common::create_test_context();
    let server = common::test_server(&ctx);

    let bad_url = server
        .post("/api/shorten")
        .authorization_bearer(API_KEY)
        .json(&json!({ "url": "not a url" }))
        .await;
    assert_eq!(bad_url.status_code(), StatusCode::BAD_REQUEST);

    let bad_ending = server
        .post("/api/shorten")
        .authorization_bearer(API_KEY)
        .json(&json!({ "url": "https://example.com", "ending": "has space" }))
        .await;
    assert_eq!(bad_ending.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        bad_ending.json::<serde_json::Value>()["error"]["code"],
        "validation_error"
    );
}

#[tokio::test]
async fn test_batch_creates_links_in_request_order() {
    let ctx = common::create_test_context();
    let server = common::test_server(&ctx);

    let response = server
        .post("/api/shorten/batch")
        .authorization_bearer(API_KEY)
        .json(&json!({
            "items": [
                { "url": "https://a.example.com" },
                { "url": "https://b.example.com", "ending": "bee" },
                { "url": "https://c.example.com" }
            ]
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["url"], "https://a.example.com");
    assert_eq!(items[1]["ending"], "BEE");
    assert_eq!(items[2]["url"], "https://c.example.com");
    assert_ne!(items[0]["ending"], items[2]["ending"]);
}

#[tokio::test]
async fn test_batch_with_taken_ending_creates_nothing() {
    let ctx = common::create_test_context();
    let server = common::test_server(&ctx);

    server
        .post("/api/shorten")
        .authorization_bearer(API_KEY)
        .json(&json!({ "url": "https://example.com", "ending": "taken" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/shorten/batch")
        .authorization_bearer(API_KEY)
        .json(&json!({
            "items": [
                { "url": "https://a.example.com", "ending": "fresh" },
                { "url": "https://b.example.com", "ending": "TAKEN" }
            ]
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let missing = server.get("/fresh").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_batch_rejects_empty_list() {
    let ctx = common::create_test_context();
    let server = common::test_server(&ctx);

    let response = server
        .post("/api/shorten/batch")
        .authorization_bearer(API_KEY)
        .json(&json!({ "items": [] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
