//! Authentication extractors.
//!
//! Handlers declare their auth requirement through extractors: [`RequireAuth`]
//! for any signed-in principal, [`RequireAdmin`] for admin sessions,
//! [`OptionalAuth`] when anonymous access is fine. All three read the session
//! cookie and go through the [`SessionResolver`](crate::auth::SessionResolver),
//! so a burst of extractions for one token costs at most one probe cycle.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::models::{SESSION_COOKIE_NAME, Session, SessionKind, SessionToken};
use crate::state::AppState;

/// The authenticated principal behind a request.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal {
    /// The token the browser presented.
    pub token: SessionToken,
    /// The session the backend vouched for.
    pub session: Session,
    /// Which endpoint vouched for it.
    pub kind: SessionKind,
}

/// Error returned when a request fails an auth requirement.
pub enum AuthRejection {
    /// No valid session.
    Unauthorized,
    /// Valid session but insufficient role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

/// Extractor that requires a signed-in principal (admin or customer).
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(principal): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", principal.session.subject_id)
/// }
/// ```
pub struct RequireAuth(pub CurrentPrincipal);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_principal(parts, state)
            .await
            .ok_or(AuthRejection::Unauthorized)
            .map(Self)
    }
}

/// Extractor that requires an admin session.
pub struct RequireAdmin(pub CurrentPrincipal);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = resolve_principal(parts, state)
            .await
            .ok_or(AuthRejection::Unauthorized)?;
        if principal.kind != SessionKind::Admin {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(principal))
    }
}

/// Extractor that optionally resolves the current principal.
///
/// Unlike `RequireAuth`, this does not reject the request when nobody is
/// signed in.
pub struct OptionalAuth(pub Option<CurrentPrincipal>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_principal(parts, state).await))
    }
}

async fn resolve_principal(parts: &Parts, state: &AppState) -> Option<CurrentPrincipal> {
    let token = session_token_from_headers(&parts.headers)?;
    let auth_state = state.resolver().resolve(&token).await;

    let session = auth_state.session()?.clone();
    let kind = auth_state.kind()?;
    Some(CurrentPrincipal {
        token,
        session,
        kind,
    })
}

/// Extract the session token from the request's `Cookie` headers.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(cookie_value)
        .map(SessionToken::new)
}

fn cookie_value(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE_NAME && !value.is_empty()).then(|| value.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value_single() {
        assert_eq!(
            cookie_value("gw_session=abc123"),
            Some("abc123".to_owned())
        );
    }

    #[test]
    fn test_cookie_value_among_others() {
        assert_eq!(
            cookie_value("theme=dark; gw_session=abc123; lang=en"),
            Some("abc123".to_owned())
        );
    }

    #[test]
    fn test_cookie_value_missing() {
        assert_eq!(cookie_value("theme=dark; lang=en"), None);
    }

    #[test]
    fn test_cookie_value_empty_is_ignored() {
        assert_eq!(cookie_value("gw_session="), None);
    }

    #[test]
    fn test_cookie_value_prefix_name_does_not_match() {
        assert_eq!(cookie_value("gw_session_old=abc"), None);
    }
}
