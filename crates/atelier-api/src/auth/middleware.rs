use std::sync::Arc;

use atelier_core::AppError;
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{header, request::Parts, HeaderMap};

use crate::auth::models::{AuthUser, UserRole};
use crate::error::HttpAppError;
use crate::middleware::audit;
use crate::state::AppState;
use crate::utils::ip_extraction::client_ip_from_parts;

/// Name of the cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "session";

/// Bearer token from `Authorization`, falling back to the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn authenticate(parts: &Parts, state: &AppState, token: &str) -> Result<AuthUser, HttpAppError> {
    let result = state
        .jwt
        .validate(token)
        .and_then(|claims| Ok((claims.sub, claims.role.parse::<UserRole>()?)));

    match result {
        Ok((user_id, role)) => Ok(AuthUser { user_id, role }),
        Err(err) => {
            audit::log_authentication_failure(&err.to_string(), client_ip_from_parts(parts));
            Err(HttpAppError(err))
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_token(&parts.headers) else {
            audit::log_authentication_failure(
                "Missing session token",
                client_ip_from_parts(parts),
            );
            return Err(HttpAppError(AppError::Unauthorized(
                "Authentication required".to_string(),
            )));
        };

        authenticate(parts, state, &token)
    }
}

/// `Option<AuthUser>`: anonymous requests pass, but a token that is present
/// must still be valid.
impl OptionalFromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Option<Self>, Self::Rejection> {
        match extract_token(&parts.headers) {
            Some(token) => authenticate(parts, state, &token).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_session_cookie_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=tok.en; other=1"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("tok.en"));
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=from-cookie"));
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_missing_or_malformed_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert!(extract_token(&headers).is_none());
    }
}
