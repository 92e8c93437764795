mod common;

use axum::http::StatusCode;

use link_endings::api::dto::health::HealthResponse;
use link_endings::application::services::ShortenItem;

#[tokio::test]
async fn test_redirect_success_queues_visit() {
    let mut ctx = common::create_test_context();
    let link = ctx
        .link_service
        .shorten(ShortenItem::new("https://example.com/target").with_ending("go"))
        .await
        .unwrap();
    let server = common::test_server(&ctx);

    let response = server
        .get("/GO")
        .add_header("User-Agent", "integration-test")
        .add_header("Referer", "https://news.example.org")
        .await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/target");

    let event = ctx.click_rx.try_recv().unwrap();
    assert_eq!(event.link_id, link.id);
    assert_eq!(event.ending, "GO");
    assert_eq!(event.context.ip, "203.0.113.77");
    assert_eq!(event.context.user_agent.as_deref(), Some("integration-test"));
    assert_eq!(
        event.context.referrer.as_deref(),
        Some("https://news.example.org")
    );
    assert!(!event.context.do_not_track);
}

#[tokio::test]
async fn test_redirect_is_case_insensitive() {
    let ctx = common::create_test_context();
    ctx.link_service
        .shorten(ShortenItem::new("https://example.com/docs").with_ending("docs"))
        .await
        .unwrap();
    let server = common::test_server(&ctx);

    let response = server.get("/Docs").await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/docs");
}

#[tokio::test]
async fn test_redirect_resolves_confusable_symbols() {
    let ctx = common::create_test_context();
    ctx.link_service
        .shorten(ShortenItem::new("https://example.com/typed").with_ending("homeis"))
        .await
        .unwrap();
    let server = common::test_server(&ctx);

    let response = server.get("/h0me-15").await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/typed");
}

#[tokio::test]
async fn test_redirect_honors_do_not_track_header() {
    let mut ctx = common::create_test_context();
    ctx.link_service
        .shorten(ShortenItem::new("https://example.com").with_ending("quiet"))
        .await
        .unwrap();
    let server = common::test_server(&ctx);

    let response = server.get("/quiet").add_header("DNT", "1").await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    let event = ctx.click_rx.try_recv().unwrap();
    assert!(event.context.do_not_track);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let mut ctx = common::create_test_context();
    let server = common::test_server(&ctx);

    let response = server.get("/NOPE42").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
    assert!(ctx.click_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_health_reports_components() {
    let ctx = common::create_test_context();
    ctx.ending_pool.refill(12).await.unwrap();
    let server = common::test_server(&ctx);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health = response.json::<HealthResponse>();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.checks.database.status, "ok");
    assert_eq!(
        health.checks.database.message.as_deref(),
        Some("Connected, 12 pooled endings")
    );
    assert_eq!(health.checks.click_queue.status, "ok");
}

#[tokio::test]
async fn test_health_degrades_when_click_queue_closes() {
    let ctx = common::create_test_context();
    let server = common::test_server(&ctx);
    let common::TestContext { click_rx, .. } = ctx;
    drop(click_rx);

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let health = response.json::<HealthResponse>();
    assert_eq!(health.status, "degraded");
    assert_eq!(health.checks.click_queue.status, "error");
}
