//! Ingredient repository.

use sqlx::PgPool;

use foodgram_core::IngredientId;

use super::{RepositoryError, id_array};
use crate::models::Ingredient;

/// Repository for ingredients.
pub struct IngredientRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> IngredientRepository<'a> {
    /// Create a new ingredient repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List ingredients ordered by name, optionally narrowed to a
    /// case-insensitive name prefix.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, prefix: Option<&str>) -> Result<Vec<Ingredient>, RepositoryError> {
        let pattern = prefix
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}%", escape_like(&p.to_lowercase())));

        let ingredients = sqlx::query_as::<_, Ingredient>(
            r"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE $1::TEXT IS NULL OR LOWER(name) LIKE $1
            ORDER BY name, measurement_unit
            ",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(ingredients)
    }

    /// Get an ingredient by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: IngredientId) -> Result<Option<Ingredient>, RepositoryError> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(ingredient)
    }

    /// Return the subset of `ids` that has no ingredient row, in input order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn missing(&self, ids: &[IngredientId]) -> Result<Vec<IngredientId>, RepositoryError> {
        let found: Vec<(IngredientId,)> =
            sqlx::query_as("SELECT id FROM ingredients WHERE id = ANY($1)")
                .bind(id_array(ids))
                .fetch_all(self.pool)
                .await?;

        Ok(ids
            .iter()
            .copied()
            .filter(|id| !found.iter().any(|(f,)| f == id))
            .collect())
    }

    /// Insert an ingredient unless the `(name, measurement_unit)` pair exists.
    ///
    /// Returns `true` if a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_if_absent(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            ON CONFLICT (name, measurement_unit) DO NOTHING
            ",
        )
        .bind(name)
        .bind(measurement_unit)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("salt"), "salt");
        assert_eq!(escape_like("100%_pure\\"), "100\\%\\_pure\\\\");
    }
}
