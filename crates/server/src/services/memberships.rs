//! Favorites, the shopping cart and the consolidated shopping list.

use sqlx::PgPool;
use tracing::instrument;

use foodgram_core::{RecipeId, UserId};

use crate::db::{MembershipKind, MembershipRepository, RecipeRepository};
use crate::error::{AppError, Result};
use crate::models::{RecipeSummary, ShoppingList};

/// Service for membership toggles.
pub struct MembershipService<'a> {
    pool: &'a PgPool,
}

impl<'a> MembershipService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a recipe to the user's favorites or cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the recipe does not exist and
    /// `AppError::Conflict` if it is already there.
    #[instrument(skip_all, fields(user_id = %user, recipe_id = %recipe_id, kind = ?kind))]
    pub async fn add(
        &self,
        user: UserId,
        recipe_id: RecipeId,
        kind: MembershipKind,
    ) -> Result<RecipeSummary> {
        let recipe = RecipeRepository::new(self.pool)
            .get(recipe_id)
            .await?
            .ok_or_else(AppError::not_found)?;

        let memberships = MembershipRepository::new(self.pool, kind);
        if memberships.exists(user, recipe_id).await? {
            return Err(AppError::Conflict(kind.already_exists().to_string()));
        }
        // The unique constraint still rejects a concurrent duplicate.
        memberships.add(user, recipe_id).await?;
        tracing::info!("Recipe added");

        Ok(RecipeSummary::from(&recipe))
    }

    /// Remove a recipe from the user's favorites or cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the recipe does not exist or is not
    /// there.
    #[instrument(skip_all, fields(user_id = %user, recipe_id = %recipe_id, kind = ?kind))]
    pub async fn remove(&self, user: UserId, recipe_id: RecipeId, kind: MembershipKind) -> Result<()> {
        RecipeRepository::new(self.pool)
            .get(recipe_id)
            .await?
            .ok_or_else(AppError::not_found)?;

        let removed = MembershipRepository::new(self.pool, kind)
            .remove(user, recipe_id)
            .await?;
        if removed {
            Ok(())
        } else {
            Err(AppError::NotFound(kind.not_present().to_string()))
        }
    }

    /// Ingredient totals across every recipe in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    #[instrument(skip_all, fields(user_id = %user))]
    pub async fn shopping_list(&self, user: UserId) -> Result<ShoppingList> {
        let list = RecipeRepository::new(self.pool).shopping_list(user).await?;
        tracing::debug!(entries = list.entries.len(), "Shopping list built");
        Ok(list)
    }
}
