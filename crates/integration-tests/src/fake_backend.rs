//! In-process fake of the account backend.
//!
//! Serves the endpoints the storefront's `BackendClient` calls, with
//! per-endpoint hit counters and switchable probe behavior so tests can
//! script grant/deny/failure sequences.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use uuid::Uuid;

/// How an identity probe endpoint responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// 200 with an identity body.
    Grant,
    /// 401, the normal "not this kind of session" answer.
    Deny,
    /// 500, a backend malfunction.
    Fail,
}

type SharedState = Arc<FakeBackendState>;

pub struct FakeBackendState {
    pub admin_mode: Mutex<ProbeMode>,
    pub customer_mode: Mutex<ProbeMode>,
    pub admin_hits: AtomicUsize,
    pub customer_hits: AtomicUsize,
    pub logout_hits: AtomicUsize,
    pub logout_fails: AtomicBool,
    pub card_list_hits: AtomicUsize,
    /// email -> (password, role)
    pub users: Mutex<HashMap<String, (String, String)>>,
    pub cards: Mutex<Vec<Value>>,
}

impl Default for FakeBackendState {
    fn default() -> Self {
        Self {
            admin_mode: Mutex::new(ProbeMode::Deny),
            customer_mode: Mutex::new(ProbeMode::Deny),
            admin_hits: AtomicUsize::new(0),
            customer_hits: AtomicUsize::new(0),
            logout_hits: AtomicUsize::new(0),
            logout_fails: AtomicBool::new(false),
            card_list_hits: AtomicUsize::new(0),
            users: Mutex::new(HashMap::new()),
            cards: Mutex::new(Vec::new()),
        }
    }
}

/// Handle to a running fake backend.
pub struct FakeBackend {
    pub state: SharedState,
    pub url: String,
}

impl FakeBackend {
    /// Bind an ephemeral port and serve the fake.
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeBackendState::default());

        let router = Router::new()
            .route("/health", get(|| async { "ok" }))
            .route("/api/auth/user", get(admin_identity))
            .route("/api/auth/customer", get(customer_identity))
            .route("/api/auth/login", post(login))
            .route("/api/auth/logout", post(logout))
            .route("/api/cards", get(list_cards))
            .route("/api/cards/{card_id}", delete(delete_card))
            .route("/api/cards/{card_id}/default", put(set_default_card))
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

    pub fn set_admin_mode(&self, mode: ProbeMode) {
        *self.state.admin_mode.lock().unwrap() = mode;
    }

    pub fn set_customer_mode(&self, mode: ProbeMode) {
        *self.state.customer_mode.lock().unwrap() = mode;
    }

    /// Register a login user. `role` is `"admin"` or `"user"`.
    pub fn add_user(&self, email: &str, password: &str, role: &str) {
        self.state
            .users
            .lock()
            .unwrap()
            .insert(email.to_owned(), (password.to_owned(), role.to_owned()));
    }

    pub fn seed_cards(&self, cards: Vec<Value>) {
        *self.state.cards.lock().unwrap() = cards;
    }

    pub fn set_logout_fails(&self, fails: bool) {
        self.state.logout_fails.store(fails, Ordering::SeqCst);
    }

    #[must_use]
    pub fn admin_hits(&self) -> usize {
        self.state.admin_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn customer_hits(&self) -> usize {
        self.state.customer_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn logout_hits(&self) -> usize {
        self.state.logout_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn card_list_hits(&self) -> usize {
        self.state.card_list_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn cards(&self) -> Vec<Value> {
        self.state.cards.lock().unwrap().clone()
    }
}

/// Build a saved-card JSON body in the backend's wire shape.
#[must_use]
pub fn card(id: &str, is_default: bool) -> Value {
    json!({
        "id": id,
        "brand": "visa",
        "last4": "4242",
        "exp_month": 12,
        "exp_year": 2030,
        "holder_name": null,
        "nickname": null,
        "is_default": is_default
    })
}

fn identity(id: &str, role: &str) -> Value {
    json!({
        "id": id,
        "role": role,
        "email_verified": true,
        "display_name": "Test Person"
    })
}

fn probe_response(mode: ProbeMode, id: &str, role: &str) -> (StatusCode, Json<Value>) {
    match mode {
        ProbeMode::Grant => (StatusCode::OK, Json(identity(id, role))),
        ProbeMode::Deny => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        ),
        ProbeMode::Fail => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "backend exploded" })),
        ),
    }
}

async fn admin_identity(State(state): State<SharedState>) -> (StatusCode, Json<Value>) {
    state.admin_hits.fetch_add(1, Ordering::SeqCst);
    let mode = *state.admin_mode.lock().unwrap();
    probe_response(mode, "admin_1", "admin")
}

async fn customer_identity(State(state): State<SharedState>) -> (StatusCode, Json<Value>) {
    state.customer_hits.fetch_add(1, Ordering::SeqCst);
    let mode = *state.customer_mode.lock().unwrap();
    probe_response(mode, "cust_1", "user")
}

async fn login(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default();

    let users = state.users.lock().unwrap();
    match users.get(&email) {
        Some((expected, role)) if expected == password => {
            let id = if role == "admin" { "admin_1" } else { "cust_1" };
            (
                StatusCode::OK,
                Json(json!({
                    "token": format!("tok-{}", Uuid::new_v4()),
                    "user": identity(id, role)
                })),
            )
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid credentials" })),
        ),
    }
}

async fn logout(State(state): State<SharedState>) -> StatusCode {
    state.logout_hits.fetch_add(1, Ordering::SeqCst);
    if state.logout_fails.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn list_cards(State(state): State<SharedState>) -> Json<Value> {
    state.card_list_hits.fetch_add(1, Ordering::SeqCst);
    Json(Value::Array(state.cards.lock().unwrap().clone()))
}

async fn delete_card(
    State(state): State<SharedState>,
    Path(card_id): Path<String>,
) -> StatusCode {
    let mut cards = state.cards.lock().unwrap();
    let before = cards.len();
    cards.retain(|card| card["id"] != card_id.as_str());
    if cards.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn set_default_card(
    State(state): State<SharedState>,
    Path(card_id): Path<String>,
) -> StatusCode {
    let mut cards = state.cards.lock().unwrap();
    if !cards.iter().any(|card| card["id"] == card_id.as_str()) {
        return StatusCode::NOT_FOUND;
    }
    for card in cards.iter_mut() {
        card["is_default"] = Value::Bool(card["id"] == card_id.as_str());
    }
    StatusCode::NO_CONTENT
}
