//! Router-level tests for everything that resolves before the database:
//! validation rejections, rate limiting, cookie handling, health checks.

use axum_test::TestServer;
use serde_json::{Value, json};

use leadgate_auth::config::AuthConfig;
use leadgate_auth::infra::ratelimit::{AppRateLimiter, MemoryRateLimiter};
use leadgate_auth::router::build_router;
use leadgate_auth::state::AppState;

fn test_config() -> AuthConfig {
    AuthConfig {
        database_url: "postgres://unused".to_owned(),
        redis_url: None,
        access_token_secret: "test-access-secret".to_owned(),
        refresh_token_secret: "test-refresh-secret".to_owned(),
        mail_api_url: "http://127.0.0.1:1/send".to_owned(),
        mail_api_key: "unused".to_owned(),
        mail_from: "noreply@example.com".to_owned(),
        cookie_domain: "example.com".to_owned(),
        auth_port: 0,
    }
}

fn server() -> TestServer {
    let state = AppState::new(
        sea_orm::DatabaseConnection::default(),
        AppRateLimiter::Memory(MemoryRateLimiter::new()),
        &test_config(),
    );
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn health_endpoints_respond_ok() {
    let server = server();
    assert_eq!(server.get("/healthz").await.status_code(), 200);
    assert_eq!(server.get("/readyz").await.status_code(), 200);
}

#[tokio::test]
async fn register_with_missing_fields_is_400() {
    let server = server();
    let response = server
        .post("/auth/register")
        .add_header("x-forwarded-for", "203.0.113.10")
        .json(&json!({ "email": "jane@example.com" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "VALIDATION");
}

#[tokio::test]
async fn login_with_empty_body_fields_is_400() {
    let server = server();
    let response = server
        .post("/auth/login")
        .add_header("x-forwarded-for", "203.0.113.11")
        .json(&json!({}))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn verify_otp_with_bad_code_shape_is_400() {
    let server = server();
    let response = server
        .post("/auth/verify-otp")
        .add_header("x-forwarded-for", "203.0.113.12")
        .json(&json!({
            "email": "jane@example.com",
            "otp": "12ab",
            "purpose": "login_verification",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION");
}

#[tokio::test]
async fn register_rate_limit_kicks_in_per_ip() {
    let server = server();
    // 3 per hour per IP; invalid bodies still consume the bucket.
    for _ in 0..3 {
        let response = server
            .post("/auth/register")
            .add_header("x-forwarded-for", "198.51.100.77")
            .json(&json!({}))
            .await;
        assert_eq!(response.status_code(), 400);
    }

    let response = server
        .post("/auth/register")
        .add_header("x-forwarded-for", "198.51.100.77")
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), 429);
    let body: Value = response.json();
    assert_eq!(body["kind"], "RATE_LIMITED");
    assert!(body["data"]["retry_after_secs"].as_u64().unwrap() <= 3600);

    // A different IP is unaffected.
    let response = server
        .post("/auth/register")
        .add_header("x-forwarded-for", "198.51.100.78")
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn me_without_cookie_is_401() {
    let server = server();
    let response = server.get("/auth/me").await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn me_with_garbage_cookie_is_401() {
    let server = server();
    let response = server
        .get("/auth/me")
        .add_header("cookie", "lg_access_token=not-a-jwt")
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn refresh_without_token_is_401() {
    let server = server();
    let response = server.post("/auth/refresh-token").json(&json!({})).await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn logout_without_session_still_clears_cookies() {
    let server = server();
    let response = server.post("/auth/logout").await;

    assert_eq!(response.status_code(), 200);
    let cookies: Vec<String> = response
        .iter_headers_by_name("set-cookie")
        .map(|v| v.to_str().unwrap().to_owned())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("lg_access_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("lg_refresh_token=")));
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
}
