//! Recipe routes: CRUD, favorites, shopping cart and the list download.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use foodgram_core::{RecipeId, UserId};

use super::extract::{ApiJson, ApiPath, QueryParams};
use crate::db::MembershipKind;
use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{RecipeFilter, ShoppingList};
use crate::services::{MembershipService, RecipeService};
use crate::state::AppState;
use crate::views::{Page, RecipeSummaryView, RecipeView, RecipeWrite};

/// Read the listing filters from the query string.
fn recipe_filter(query: &QueryParams) -> Result<RecipeFilter> {
    Ok(RecipeFilter {
        authors: query
            .integers::<i32>("author")?
            .into_iter()
            .map(UserId::new)
            .collect(),
        tags: query.get_all("tags"),
        is_favorited: query.flag("is_favorited")?,
        is_in_shopping_cart: query.flag("is_in_shopping_cart")?,
    })
}

/// GET /api/recipes
///
/// # Errors
///
/// Returns `AppError::Validation` for malformed filters or paging.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    query: QueryParams,
) -> Result<Json<Page<RecipeView>>> {
    let filter = recipe_filter(&query)?;
    let page = query.page_request(&state.config().pagination)?;

    let listing = RecipeService::new(state.pool(), state.media())
        .list(caller.as_ref().map(|c| c.id()), &filter, page)
        .await?;

    let link = query.link(&state.config().base_url)?;
    let media = state.media();
    Ok(Json(Page::new(
        listing.map(|d| RecipeView::new(&d, media)),
        page,
        &link,
    )))
}

/// POST /api/recipes
///
/// # Errors
///
/// Returns field-scoped validation errors for an invalid recipe.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiJson(write): ApiJson<RecipeWrite>,
) -> Result<(StatusCode, Json<RecipeView>)> {
    let details = RecipeService::new(state.pool(), state.media())
        .create(caller.id(), &write)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RecipeView::new(&details, state.media())),
    ))
}

/// GET /api/recipes/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the recipe does not exist.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    ApiPath(id): ApiPath<RecipeId>,
) -> Result<Json<RecipeView>> {
    let details = RecipeService::new(state.pool(), state.media())
        .get(caller.as_ref().map(|c| c.id()), id)
        .await?;
    Ok(Json(RecipeView::new(&details, state.media())))
}

/// PATCH or PUT /api/recipes/{id}
///
/// Both methods replace the recipe's contents.
///
/// # Errors
///
/// Returns `AppError::Forbidden` unless the caller is the author.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<RecipeId>,
    ApiJson(write): ApiJson<RecipeWrite>,
) -> Result<Json<RecipeView>> {
    let details = RecipeService::new(state.pool(), state.media())
        .update(caller.id(), id, &write)
        .await?;
    Ok(Json(RecipeView::new(&details, state.media())))
}

/// DELETE /api/recipes/{id}
///
/// # Errors
///
/// Returns `AppError::Forbidden` unless the caller is the author.
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<RecipeId>,
) -> Result<StatusCode> {
    RecipeService::new(state.pool(), state.media())
        .delete(caller.id(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_membership(
    state: &AppState,
    caller: UserId,
    id: RecipeId,
    kind: MembershipKind,
) -> Result<(StatusCode, Json<RecipeSummaryView>)> {
    let summary = MembershipService::new(state.pool())
        .add(caller, id, kind)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RecipeSummaryView::new(&summary, state.media())),
    ))
}

async fn remove_membership(
    state: &AppState,
    caller: UserId,
    id: RecipeId,
    kind: MembershipKind,
) -> Result<StatusCode> {
    MembershipService::new(state.pool())
        .remove(caller, id, kind)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/favorite
///
/// # Errors
///
/// Returns `AppError::Conflict` if already a favorite.
pub async fn favorite(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<RecipeId>,
) -> Result<(StatusCode, Json<RecipeSummaryView>)> {
    add_membership(&state, caller.id(), id, MembershipKind::Favorite).await
}

/// DELETE /api/recipes/{id}/favorite
///
/// # Errors
///
/// Returns `AppError::NotFound` if not a favorite.
pub async fn unfavorite(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<RecipeId>,
) -> Result<StatusCode> {
    remove_membership(&state, caller.id(), id, MembershipKind::Favorite).await
}

/// POST /api/recipes/{id}/shopping_cart
///
/// # Errors
///
/// Returns `AppError::Conflict` if already in the cart.
pub async fn add_to_cart(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<RecipeId>,
) -> Result<(StatusCode, Json<RecipeSummaryView>)> {
    add_membership(&state, caller.id(), id, MembershipKind::ShoppingCart).await
}

/// DELETE /api/recipes/{id}/shopping_cart
///
/// # Errors
///
/// Returns `AppError::NotFound` if not in the cart.
pub async fn remove_from_cart(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<RecipeId>,
) -> Result<StatusCode> {
    remove_membership(&state, caller.id(), id, MembershipKind::ShoppingCart).await
}

/// GET /api/recipes/download_shopping_cart
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
) -> Result<impl IntoResponse> {
    let list = MembershipService::new(state.pool())
        .shopping_list(caller.id())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ShoppingList::FILENAME),
            ),
        ],
        list.render(),
    ))
}
