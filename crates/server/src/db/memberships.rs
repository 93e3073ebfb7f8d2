//! Membership rows: favorites and shopping-cart entries.
//!
//! Both tables have the same shape (`user_id`, `recipe_id`, unique pair), so
//! one repository serves both, parameterized by [`MembershipKind`].

use std::collections::HashSet;

use sqlx::PgPool;

use foodgram_core::{RecipeId, UserId};

use super::{RepositoryError, id_array, map_unique_violation};

/// Which membership table to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipKind {
    Favorite,
    ShoppingCart,
}

impl MembershipKind {
    const fn table(self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::ShoppingCart => "shopping_cart",
        }
    }

    const fn unique_constraint(self) -> &'static str {
        match self {
            Self::Favorite => "favorites_unique_pair",
            Self::ShoppingCart => "shopping_cart_unique_pair",
        }
    }

    /// Message for adding a pair that already exists.
    #[must_use]
    pub const fn already_exists(self) -> &'static str {
        match self {
            Self::Favorite => "Recipe is already in favorites.",
            Self::ShoppingCart => "Recipe is already in the shopping cart.",
        }
    }

    /// Message for removing a pair that does not exist.
    #[must_use]
    pub const fn not_present(self) -> &'static str {
        match self {
            Self::Favorite => "Recipe is not in favorites.",
            Self::ShoppingCart => "Recipe is not in the shopping cart.",
        }
    }
}

/// Repository for favorites and shopping-cart entries.
pub struct MembershipRepository<'a> {
    pool: &'a PgPool,
    kind: MembershipKind,
}

impl<'a> MembershipRepository<'a> {
    /// Create a repository for one membership table.
    #[must_use]
    pub const fn new(pool: &'a PgPool, kind: MembershipKind) -> Self {
        Self { pool, kind }
    }

    /// Whether the `(user, recipe)` pair exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, user: UserId, recipe: RecipeId) -> Result<bool, RepositoryError> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = $1 AND recipe_id = $2)",
            self.kind.table()
        );
        let row: (bool,) = sqlx::query_as(&sql)
            .bind(user)
            .bind(recipe)
            .fetch_one(self.pool)
            .await?;
        Ok(row.0)
    }

    /// Insert the pair.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the pair already exists (the
    /// unique constraint decides under concurrent requests).
    pub async fn add(&self, user: UserId, recipe: RecipeId) -> Result<(), RepositoryError> {
        let sql = format!(
            "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2)",
            self.kind.table()
        );
        let kind = self.kind;
        sqlx::query(&sql)
            .bind(user)
            .bind(recipe)
            .execute(self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(e, |constraint| {
                    (constraint == kind.unique_constraint())
                        .then(|| kind.already_exists().to_owned())
                })
            })?;
        Ok(())
    }

    /// Delete the pair. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user: UserId, recipe: RecipeId) -> Result<bool, RepositoryError> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            self.kind.table()
        );
        let result = sqlx::query(&sql)
            .bind(user)
            .bind(recipe)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Which of `recipes` the user has a membership row for.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recipes_among(
        &self,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, RepositoryError> {
        if recipes.is_empty() {
            return Ok(HashSet::new());
        }
        let sql = format!(
            "SELECT recipe_id FROM {} WHERE user_id = $1 AND recipe_id = ANY($2)",
            self.kind.table()
        );
        let rows: Vec<(RecipeId,)> = sqlx::query_as(&sql)
            .bind(user)
            .bind(id_array(recipes))
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}
