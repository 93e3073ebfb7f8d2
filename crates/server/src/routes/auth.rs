//! Token login and logout.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use super::extract::ApiJson;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub auth_token: String,
}

/// POST /api/auth/token/login
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` for a wrong email or password.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth_token = AuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(LoginResponse { auth_token }))
}

/// POST /api/auth/token/logout
///
/// # Errors
///
/// Returns `AppError::Unauthorized` without a valid token.
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
) -> Result<StatusCode> {
    AuthService::new(state.pool()).logout(&caller.token).await?;
    sentry::configure_scope(|scope| scope.set_user(None));
    Ok(StatusCode::NO_CONTENT)
}
