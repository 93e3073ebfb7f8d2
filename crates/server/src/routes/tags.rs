//! Tag routes. Tags are read-only and unpaginated.

use axum::{Json, extract::State};

use foodgram_core::TagId;

use super::extract::ApiPath;
use crate::db::TagRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::views::TagView;

/// GET /api/tags
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<TagView>>> {
    let tags = TagRepository::new(state.pool()).list().await?;
    Ok(Json(tags.iter().map(TagView::from).collect()))
}

/// GET /api/tags/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the tag does not exist.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TagId>,
) -> Result<Json<TagView>> {
    let tag = TagRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(TagView::from(&tag)))
}
