//! Session probe precedence, degradation, and caching.

use giftwell_integration_tests::{TestContext, fake_backend::ProbeMode};
use serde_json::Value;

async fn session_with_token(ctx: &TestContext, token: &str) -> Value {
    TestContext::plain_client()
        .get(ctx.url("/auth/session"))
        .header("Cookie", format!("gw_session={token}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_admin_probe_short_circuits_customer() {
    let ctx = TestContext::start().await;
    ctx.backend.set_admin_mode(ProbeMode::Grant);
    ctx.backend.set_customer_mode(ProbeMode::Grant);

    let body = session_with_token(&ctx, "tok-a").await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["kind"], "admin");
    assert_eq!(ctx.backend.admin_hits(), 1);
    assert_eq!(ctx.backend.customer_hits(), 0);
}

#[tokio::test]
async fn test_denied_admin_falls_through_to_customer() {
    let ctx = TestContext::start().await;
    ctx.backend.set_admin_mode(ProbeMode::Deny);
    ctx.backend.set_customer_mode(ProbeMode::Grant);

    let body = session_with_token(&ctx, "tok-c").await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["kind"], "customer");
    assert_eq!(ctx.backend.admin_hits(), 1);
    assert_eq!(ctx.backend.customer_hits(), 1);
}

#[tokio::test]
async fn test_failed_admin_probe_falls_through_like_a_denial() {
    let ctx = TestContext::start().await;
    ctx.backend.set_admin_mode(ProbeMode::Fail);
    ctx.backend.set_customer_mode(ProbeMode::Grant);

    let body = session_with_token(&ctx, "tok-c").await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["kind"], "customer");
}

#[tokio::test]
async fn test_both_probes_failing_resolves_anonymous() {
    let ctx = TestContext::start().await;
    ctx.backend.set_admin_mode(ProbeMode::Deny);
    ctx.backend.set_customer_mode(ProbeMode::Fail);

    let body = session_with_token(&ctx, "tok-x").await;
    assert_eq!(body["authenticated"], false);
    assert!(body.get("kind").is_none());
}

#[tokio::test]
async fn test_probe_result_is_cached_per_token() {
    let ctx = TestContext::start().await;
    ctx.backend.set_admin_mode(ProbeMode::Grant);

    session_with_token(&ctx, "tok-a").await;
    session_with_token(&ctx, "tok-a").await;
    assert_eq!(ctx.backend.admin_hits(), 1);

    session_with_token(&ctx, "tok-b").await;
    assert_eq!(ctx.backend.admin_hits(), 2);
}

#[tokio::test]
async fn test_concurrent_resolutions_share_one_probe_cycle() {
    let ctx = TestContext::start().await;
    ctx.backend.set_admin_mode(ProbeMode::Deny);
    ctx.backend.set_customer_mode(ProbeMode::Grant);

    let client = TestContext::plain_client();
    let url = ctx.url("/auth/session");

    let mut handles = Vec::new();
    for _ in 0..10 {
        let client = client.clone();
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            let body: Value = client
                .get(&url)
                .header("Cookie", "gw_session=tok-shared")
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            body
        }));
    }

    for handle in handles {
        let body = handle.await.unwrap();
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["kind"], "customer");
    }

    assert_eq!(ctx.backend.admin_hits(), 1);
    assert_eq!(ctx.backend.customer_hits(), 1);
}
