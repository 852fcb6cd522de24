//! Surface-level HTTP behavior: health probes and auth gating.

use giftwell_integration_tests::TestContext;
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_is_always_ok() {
    let ctx = TestContext::start().await;

    let response = TestContext::plain_client()
        .get(ctx.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_readiness_checks_the_backend() {
    let ctx = TestContext::start().await;

    let response = TestContext::plain_client()
        .get(ctx.url("/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_routes_reject_anonymous_requests() {
    let ctx = TestContext::start().await;
    let client = TestContext::plain_client();

    for path in ["/api/cards", "/api/gift-cards/gftc:x/activities"] {
        let response = client.get(ctx.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
async fn test_session_endpoint_is_open_to_anonymous_visitors() {
    let ctx = TestContext::start().await;

    let response = TestContext::plain_client()
        .get(ctx.url("/auth/session"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_logout_clears_the_browser_cookie() {
    let ctx = TestContext::start().await;

    let response = TestContext::plain_client()
        .post(ctx.url("/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(set_cookie.contains("gw_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}
