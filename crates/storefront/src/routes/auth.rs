//! Login, logout, and session introspection.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::auth::session_token_from_headers;
use crate::middleware::{CurrentPrincipal, OptionalAuth};
use crate::models::{SESSION_COOKIE_NAME, SessionKind};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub redirect_to: &'static str,
    pub kind: SessionKind,
}

/// POST /auth/login
///
/// On success sets the session cookie and returns the role landing route.
pub async fn login(
    State(state): State<crate::state::AppState>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse> {
    let outcome = state.auth().login(&body.email, &body.password).await?;

    let kind = outcome
        .auth_state
        .kind()
        .ok_or_else(|| AppError::Internal("login produced no session kind".to_owned()))?;

    let cookie = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
        outcome.token.expose()
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(LoginResponse {
            redirect_to: outcome.redirect_to,
            kind,
        }),
    ))
}

/// POST /auth/logout
///
/// Best-effort: always clears the cookie, even when the backend call fails.
pub async fn logout(
    State(state): State<crate::state::AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = session_token_from_headers(&headers) {
        state.auth().logout(&token).await;
    }

    let clear_cookie = format!(
        "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    );
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, clear_cookie)]),
    )
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SessionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
}

/// GET /auth/session
///
/// Never fails: anonymous visitors get `authenticated: false`.
pub async fn session(OptionalAuth(principal): OptionalAuth) -> Json<SessionResponse> {
    let response = principal.map_or(
        SessionResponse {
            authenticated: false,
            kind: None,
            subject_id: None,
            display_name: None,
            email_verified: None,
        },
        |CurrentPrincipal { session, kind, .. }| SessionResponse {
            authenticated: true,
            kind: Some(kind),
            subject_id: Some(session.subject_id.into_inner()),
            display_name: session.display_name,
            email_verified: session.email_verified,
        },
    );
    Json(response)
}
