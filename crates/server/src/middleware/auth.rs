//! Token authentication extractors.
//!
//! Clients send `Authorization: Token <key>`. Headers with another scheme
//! are ignored (the request is anonymous); a malformed or unknown token is
//! rejected with 401 even on routes that allow anonymous access.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Authorization scheme for API tokens.
const TOKEN_SCHEME: &str = "Token";

/// Extractor that requires an authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireAuth(caller): RequireAuth) -> Json<UserView> {
///     Json(UserView::from_user(&caller.user, false))
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await?
            .map(Self)
            .ok_or_else(AppError::unauthenticated)
    }
}

/// Extractor that resolves the caller when a token is present.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts, state).await?))
    }
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, AppError> {
    let Some(token) = token_from_headers(&parts.headers)? else {
        return Ok(None);
    };

    let user = AuthService::new(state.pool()).authenticate(token).await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));

    Ok(Some(CurrentUser {
        user,
        token: token.to_string(),
    }))
}

/// Extract the key from an `Authorization: Token <key>` header.
fn token_from_headers(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid token header.".to_string()))?;

    let mut parts = value.split_whitespace();
    let Some(scheme) = parts.next() else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case(TOKEN_SCHEME) {
        return Ok(None);
    }

    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(Some(key)),
        (None, _) => Err(AppError::Unauthorized(
            "Invalid token header. No credentials provided.".to_string(),
        )),
        (Some(_), Some(_)) => Err(AppError::Unauthorized(
            "Invalid token header. Token string should not contain spaces.".to_string(),
        )),
    }
}
