//! Ingredient routes with case-insensitive prefix search.

use axum::{Json, extract::State};

use foodgram_core::IngredientId;

use super::extract::{ApiPath, QueryParams};
use crate::db::IngredientRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::views::IngredientView;

/// GET /api/ingredients?name=<prefix>
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn index(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<Vec<IngredientView>>> {
    let ingredients = IngredientRepository::new(state.pool())
        .search(query.get("name"))
        .await?;
    Ok(Json(ingredients.iter().map(IngredientView::from).collect()))
}

/// GET /api/ingredients/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the ingredient does not exist.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<IngredientId>,
) -> Result<Json<IngredientView>> {
    let ingredient = IngredientRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(IngredientView::from(&ingredient)))
}
