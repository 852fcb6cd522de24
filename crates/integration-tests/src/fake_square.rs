//! In-process fake of the Square gift card API.
//!
//! Maintains gift card balances in memory, records every request (method,
//! path, body) so tests can assert on the wire shape, and can be primed to
//! return a vendor error on the next call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use uuid::Uuid;

type SharedState = Arc<FakeSquareState>;

/// One request as the fake saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
pub struct FakeSquareState {
    pub requests: Mutex<Vec<RecordedRequest>>,
    /// gift card id -> balance in minor units
    pub balances: Mutex<HashMap<String, i64>>,
    pub activities: Mutex<Vec<Value>>,
    /// Errors array to return (400) on the next mutating call.
    pub fail_next: Mutex<Option<Value>>,
}

/// Handle to a running fake Square API.
pub struct FakeSquare {
    pub state: SharedState,
    pub url: String,
}

impl FakeSquare {
    /// Bind an ephemeral port and serve the fake.
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeSquareState::default());

        let router = Router::new()
            .route("/v2/gift-cards", post(create_gift_card))
            .route("/v2/gift-cards/activities", post(create_activity).get(list_activities))
            .route("/v2/gift-cards/{gift_card_id}", get(retrieve_gift_card))
            .route("/v2/online-checkout/payment-links", post(create_payment_link))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            state,
            url: format!("http://{addr}"),
        }
    }

    /// Seed a card with a known balance.
    pub fn seed_card(&self, gift_card_id: &str, balance_minor: i64) {
        self.state
            .balances
            .lock()
            .unwrap()
            .insert(gift_card_id.to_owned(), balance_minor);
    }

    #[must_use]
    pub fn balance(&self, gift_card_id: &str) -> Option<i64> {
        self.state.balances.lock().unwrap().get(gift_card_id).copied()
    }

    /// Make the next mutating call fail with the given Square errors array.
    pub fn fail_next(&self, errors: Value) {
        *self.state.fail_next.lock().unwrap() = Some(errors);
    }

    #[must_use]
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Idempotency keys of recorded requests to a path, in order.
    #[must_use]
    pub fn idempotency_keys(&self, path: &str) -> Vec<String> {
        self.recorded()
            .iter()
            .filter(|req| req.path == path)
            .filter_map(|req| req.body["idempotency_key"].as_str().map(str::to_owned))
            .collect()
    }
}

fn record(state: &FakeSquareState, method: &str, path: &str, body: Value) {
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_owned(),
        path: path.to_owned(),
        body,
    });
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "errors": [{
                "category": "AUTHENTICATION_ERROR",
                "code": "UNAUTHORIZED",
                "detail": "missing bearer token"
            }]
        })),
    )
}

fn check_auth(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer "))
}

fn take_failure(state: &FakeSquareState) -> Option<(StatusCode, Json<Value>)> {
    state
        .fail_next
        .lock()
        .unwrap()
        .take()
        .map(|errors| (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))))
}

fn gift_card_json(id: &str, balance_minor: i64) -> Value {
    json!({
        "id": id,
        "gan": "7783320001001635",
        "state": "ACTIVE",
        "balance_money": { "amount": balance_minor, "currency": "USD" }
    })
}

async fn create_gift_card(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record(&state, "POST", "/v2/gift-cards", body);
    if !check_auth(&headers) {
        return unauthorized();
    }
    if let Some(failure) = take_failure(&state) {
        return failure;
    }

    let id = format!("gftc:{}", Uuid::new_v4().simple());
    state.balances.lock().unwrap().insert(id.clone(), 0);
    (
        StatusCode::OK,
        Json(json!({ "gift_card": gift_card_json(&id, 0) })),
    )
}

async fn create_activity(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record(&state, "POST", "/v2/gift-cards/activities", body.clone());
    if !check_auth(&headers) {
        return unauthorized();
    }
    if let Some(failure) = take_failure(&state) {
        return failure;
    }

    let activity = &body["gift_card_activity"];
    let kind = activity["type"].as_str().unwrap_or_default().to_owned();
    let gift_card_id = activity["gift_card_id"].as_str().unwrap_or_default().to_owned();

    let details_key = match kind.as_str() {
        "ACTIVATE" => "activate_activity_details",
        "LOAD" => "load_activity_details",
        "REDEEM" => "redeem_activity_details",
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "errors": [{
                        "category": "INVALID_REQUEST_ERROR",
                        "code": "BAD_REQUEST",
                        "detail": format!("unsupported activity type {kind}")
                    }]
                })),
            );
        }
    };
    let amount = activity[details_key]["amount_money"]["amount"]
        .as_i64()
        .unwrap_or_default();

    let mut balances = state.balances.lock().unwrap();
    let Some(balance) = balances.get_mut(&gift_card_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "errors": [{
                    "category": "INVALID_REQUEST_ERROR",
                    "code": "NOT_FOUND",
                    "detail": "gift card not found"
                }]
            })),
        );
    };

    if kind == "REDEEM" {
        if *balance < amount {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "errors": [{
                        "category": "PAYMENT_METHOD_ERROR",
                        "code": "INSUFFICIENT_FUNDS",
                        "detail": "gift card balance too low"
                    }]
                })),
            );
        }
        *balance -= amount;
    } else {
        *balance += amount;
    }
    let balance_after = *balance;
    drop(balances);

    let activity_json = json!({
        "id": format!("gcact_{}", Uuid::new_v4().simple()),
        "type": kind,
        "gift_card_id": gift_card_id,
        "gift_card_balance_money": { "amount": balance_after, "currency": "USD" },
        details_key: { "amount_money": { "amount": amount, "currency": "USD" } },
        "created_at": "2026-01-15T10:00:00Z"
    });
    state.activities.lock().unwrap().push(activity_json.clone());

    (
        StatusCode::OK,
        Json(json!({ "gift_card_activity": activity_json })),
    )
}

async fn retrieve_gift_card(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(gift_card_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    record(
        &state,
        "GET",
        &format!("/v2/gift-cards/{gift_card_id}"),
        Value::Null,
    );
    if !check_auth(&headers) {
        return unauthorized();
    }

    let balances = state.balances.lock().unwrap();
    balances.get(&gift_card_id).map_or_else(
        || {
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "errors": [{
                        "category": "INVALID_REQUEST_ERROR",
                        "code": "NOT_FOUND",
                        "detail": "gift card not found"
                    }]
                })),
            )
        },
        |balance| {
            (
                StatusCode::OK,
                Json(json!({ "gift_card": gift_card_json(&gift_card_id, *balance) })),
            )
        },
    )
}

async fn list_activities(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    record(&state, "GET", "/v2/gift-cards/activities", Value::Null);
    if !check_auth(&headers) {
        return unauthorized();
    }

    let gift_card_id = params.get("gift_card_id").cloned().unwrap_or_default();
    let activities: Vec<Value> = state
        .activities
        .lock()
        .unwrap()
        .iter()
        .filter(|activity| activity["gift_card_id"] == gift_card_id.as_str())
        .cloned()
        .collect();

    (
        StatusCode::OK,
        Json(json!({ "gift_card_activities": activities })),
    )
}

async fn create_payment_link(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record(&state, "POST", "/v2/online-checkout/payment-links", body);
    if !check_auth(&headers) {
        return unauthorized();
    }
    if let Some(failure) = take_failure(&state) {
        return failure;
    }

    (
        StatusCode::OK,
        Json(json!({
            "payment_link": {
                "id": format!("plink_{}", Uuid::new_v4().simple()),
                "url": "https://square.link/u/test",
                "order_id": "order_1"
            }
        })),
    )
}
