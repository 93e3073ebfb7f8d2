//! User routes: registration, profiles, password change and subscriptions.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use foodgram_core::UserId;

use super::extract::{ApiJson, ApiPath, QueryParams};
use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::services::{AuthService, FollowService, Registration, UserService};
use crate::state::AppState;
use crate::views::{Page, RegisteredUserView, SubscriptionView, UserView};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Self {
            email: request.email,
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
            password: request.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// GET /api/users
///
/// # Errors
///
/// Returns `AppError::Validation` for bad paging parameters.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    query: QueryParams,
) -> Result<Json<Page<UserView>>> {
    let page = query.page_request(&state.config().pagination)?;
    let listing = UserService::new(state.pool())
        .list(caller.as_ref().map(|c| c.id()), page)
        .await?;

    let link = query.link(&state.config().base_url)?;
    Ok(Json(Page::new(listing.map(|p| UserView::from(&p)), page, &link)))
}

/// POST /api/users
///
/// # Errors
///
/// Returns field-scoped validation errors for bad input or taken names.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredUserView>)> {
    let user = AuthService::new(state.pool())
        .register(&request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(RegisteredUserView::from(&user))))
}

/// GET /api/users/me
pub async fn me(RequireAuth(caller): RequireAuth) -> Json<UserView> {
    Json(UserView::new(&caller.user, false))
}

/// POST /api/users/set_password
///
/// # Errors
///
/// Returns a validation error if the current password is wrong or the new
/// one is too short.
pub async fn set_password(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiJson(request): ApiJson<SetPasswordRequest>,
) -> Result<StatusCode> {
    AuthService::new(state.pool())
        .set_password(caller.id(), &request.current_password, &request.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/subscriptions
///
/// # Errors
///
/// Returns `AppError::Validation` for bad paging or `recipes_limit` values.
pub async fn subscriptions(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    query: QueryParams,
) -> Result<Json<Page<SubscriptionView>>> {
    let page = query.page_request(&state.config().pagination)?;
    let recipes_limit = query.recipes_limit()?;
    let listing = FollowService::new(state.pool())
        .subscriptions(caller.id(), page, recipes_limit)
        .await?;

    let link = query.link(&state.config().base_url)?;
    let media = state.media();
    Ok(Json(Page::new(
        listing.map(|s| SubscriptionView::new(&s, media)),
        page,
        &link,
    )))
}

/// GET /api/users/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the user does not exist.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<UserView>> {
    let profile = UserService::new(state.pool())
        .get(caller.as_ref().map(|c| c.id()), id)
        .await?;
    Ok(Json(UserView::from(&profile)))
}

/// POST /api/users/{id}/subscribe
///
/// # Errors
///
/// Returns a validation error when following yourself, `AppError::NotFound`
/// for an unknown author and `AppError::Conflict` if already following.
pub async fn subscribe(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(author): ApiPath<UserId>,
    query: QueryParams,
) -> Result<(StatusCode, Json<SubscriptionView>)> {
    let recipes_limit = query.recipes_limit()?;
    let subscription = FollowService::new(state.pool())
        .subscribe(caller.id(), author, recipes_limit)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionView::new(&subscription, state.media())),
    ))
}

/// DELETE /api/users/{id}/subscribe
///
/// # Errors
///
/// Returns `AppError::NotFound` if the author is unknown or not followed.
pub async fn unsubscribe(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(author): ApiPath<UserId>,
) -> Result<StatusCode> {
    FollowService::new(state.pool())
        .unsubscribe(caller.id(), author)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
