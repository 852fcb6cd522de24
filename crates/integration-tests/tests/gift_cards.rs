//! Gift card operations through the Square adapter.

use giftwell_integration_tests::{TestContext, fake_backend::ProbeMode};
use reqwest::StatusCode;
use serde_json::{Value, json};

const ADMIN_COOKIE: &str = "gw_session=tok-admin";
const CUSTOMER_COOKIE: &str = "gw_session=tok-customer";

async fn admin_ctx() -> TestContext {
    let ctx = TestContext::start().await;
    ctx.backend.set_admin_mode(ProbeMode::Grant);
    ctx
}

async fn customer_ctx() -> TestContext {
    let ctx = TestContext::start().await;
    ctx.backend.set_customer_mode(ProbeMode::Grant);
    ctx
}

#[tokio::test]
async fn test_create_sends_minor_units_on_the_wire() {
    let ctx = admin_ctx().await;

    let response = TestContext::plain_client()
        .post(ctx.url("/api/gift-cards"))
        .header("Cookie", ADMIN_COOKIE)
        .json(&json!({ "amount": "19.99" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let card: Value = response.json().await.unwrap();
    assert!(card["id"].as_str().unwrap().starts_with("gftc:"));
    assert_eq!(card["balance"]["amount"], "19.99");
    assert_eq!(card["balance"]["currency"], "USD");

    // The vendor saw cents, not a decimal
    let recorded = ctx.square.recorded();
    let activate = recorded
        .iter()
        .find(|req| req.path == "/v2/gift-cards/activities")
        .unwrap();
    assert_eq!(activate.body["gift_card_activity"]["type"], "ACTIVATE");
    assert_eq!(
        activate.body["gift_card_activity"]["activate_activity_details"]["amount_money"]["amount"],
        1999
    );
}

#[tokio::test]
async fn test_create_requires_an_admin_session() {
    let ctx = customer_ctx().await;

    let response = TestContext::plain_client()
        .post(ctx.url("/api/gift-cards"))
        .header("Cookie", CUSTOMER_COOKIE)
        .json(&json!({ "amount": "10.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_redeem_decrements_the_balance() {
    let ctx = customer_ctx().await;
    ctx.square.seed_card("gftc:seeded", 5000);

    let response = TestContext::plain_client()
        .post(ctx.url("/api/gift-cards/gftc:seeded/redeem"))
        .header("Cookie", CUSTOMER_COOKIE)
        .json(&json!({ "amount": "19.99" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let activity: Value = response.json().await.unwrap();
    assert_eq!(activity["kind"], "REDEEM");
    assert_eq!(activity["amount"]["amount"], "19.99");
    assert_eq!(activity["balance_after"]["amount"], "30.01");

    assert_eq!(ctx.square.balance("gftc:seeded"), Some(3001));
}

#[tokio::test]
async fn test_insufficient_funds_surfaces_as_gateway_error() {
    let ctx = customer_ctx().await;
    ctx.square.seed_card("gftc:poor", 100);

    let response = TestContext::plain_client()
        .post(ctx.url("/api/gift-cards/gftc:poor/redeem"))
        .header("Cookie", CUSTOMER_COOKIE)
        .json(&json!({ "amount": "19.99" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body: Value = response.json().await.unwrap();
    // Vendor error details never leak to the client
    assert_eq!(body["error"], "Payment service error");

    // Balance untouched
    assert_eq!(ctx.square.balance("gftc:poor"), Some(100));
}

#[tokio::test]
async fn test_zero_and_negative_amounts_are_rejected() {
    let ctx = customer_ctx().await;
    ctx.square.seed_card("gftc:seeded", 5000);

    for amount in ["0", "-5.00"] {
        let response = TestContext::plain_client()
            .post(ctx.url("/api/gift-cards/gftc:seeded/redeem"))
            .header("Cookie", CUSTOMER_COOKIE)
            .json(&json!({ "amount": amount }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    assert!(ctx.square.recorded().is_empty());
}

#[tokio::test]
async fn test_same_correlation_id_repeats_the_idempotency_key() {
    let ctx = customer_ctx().await;
    ctx.square.seed_card("gftc:seeded", 100_000);

    let client = TestContext::plain_client();
    for _ in 0..2 {
        client
            .post(ctx.url("/api/gift-cards/gftc:seeded/redeem"))
            .header("Cookie", CUSTOMER_COOKIE)
            .json(&json!({ "amount": "5.00", "correlation_id": "order-9" }))
            .send()
            .await
            .unwrap();
    }
    client
        .post(ctx.url("/api/gift-cards/gftc:seeded/redeem"))
        .header("Cookie", CUSTOMER_COOKIE)
        .json(&json!({ "amount": "5.00", "correlation_id": "order-10" }))
        .send()
        .await
        .unwrap();

    let keys = ctx.square.idempotency_keys("/v2/gift-cards/activities");
    assert_eq!(keys.len(), 3);
    assert_eq!(keys[0], keys[1]);
    assert_ne!(keys[0], keys[2]);
}

#[tokio::test]
async fn test_load_requires_admin_and_adds_funds() {
    let ctx = admin_ctx().await;
    ctx.square.seed_card("gftc:seeded", 1000);

    let response = TestContext::plain_client()
        .post(ctx.url("/api/gift-cards/gftc:seeded/load"))
        .header("Cookie", ADMIN_COOKIE)
        .json(&json!({ "amount": "25.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ctx.square.balance("gftc:seeded"), Some(3500));
}

#[tokio::test]
async fn test_activities_listing_returns_the_ledger() {
    let ctx = customer_ctx().await;
    ctx.square.seed_card("gftc:seeded", 10_000);

    let client = TestContext::plain_client();
    for amount in ["5.00", "7.50"] {
        client
            .post(ctx.url("/api/gift-cards/gftc:seeded/redeem"))
            .header("Cookie", CUSTOMER_COOKIE)
            .json(&json!({ "amount": amount }))
            .send()
            .await
            .unwrap();
    }

    let activities: Vec<Value> = client
        .get(ctx.url("/api/gift-cards/gftc:seeded/activities"))
        .header("Cookie", CUSTOMER_COOKIE)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(activities.len(), 2);
    assert!(activities.iter().all(|a| a["kind"] == "REDEEM"));
    assert!(activities.iter().all(|a| a["gift_card_id"] == "gftc:seeded"));
}

#[tokio::test]
async fn test_payment_link_carries_price_and_location() {
    let ctx = customer_ctx().await;

    let response = TestContext::plain_client()
        .post(ctx.url("/api/checkout/payment-link"))
        .header("Cookie", CUSTOMER_COOKIE)
        .json(&json!({ "amount": "25.00", "name": "Birthday Gift Card" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let link: Value = response.json().await.unwrap();
    assert_eq!(link["url"], "https://square.link/u/test");

    let recorded = ctx.square.recorded();
    let request = recorded
        .iter()
        .find(|req| req.path == "/v2/online-checkout/payment-links")
        .unwrap();
    assert_eq!(request.body["quick_pay"]["name"], "Birthday Gift Card");
    assert_eq!(request.body["quick_pay"]["price_money"]["amount"], 2500);
    assert_eq!(request.body["quick_pay"]["location_id"], "L_TEST");
}

#[tokio::test]
async fn test_primed_vendor_error_maps_to_gateway_error() {
    let ctx = customer_ctx().await;

    ctx.square.fail_next(json!([{
        "category": "INVALID_REQUEST_ERROR",
        "code": "VALUE_TOO_LOW",
        "detail": "amount below minimum"
    }]));

    let response = TestContext::plain_client()
        .post(ctx.url("/api/checkout/payment-link"))
        .header("Cookie", CUSTOMER_COOKIE)
        .json(&json!({ "amount": "0.01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
