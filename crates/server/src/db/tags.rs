//! Tag repository.

use sqlx::PgPool;

use foodgram_core::{HexColor, TagId};

use super::{RepositoryError, id_array};
use crate::models::Tag;

/// Repository for tags.
pub struct TagRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepository<'a> {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all tags ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Tag>, RepositoryError> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags ORDER BY name")
            .fetch_all(self.pool)
            .await?;
        Ok(tags)
    }

    /// Get a tag by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TagId) -> Result<Option<Tag>, RepositoryError> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(tag)
    }

    /// Return the subset of `ids` that has no tag row, in input order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn missing(&self, ids: &[TagId]) -> Result<Vec<TagId>, RepositoryError> {
        let found: Vec<(TagId,)> = sqlx::query_as("SELECT id FROM tags WHERE id = ANY($1)")
            .bind(id_array(ids))
            .fetch_all(self.pool)
            .await?;

        Ok(ids
            .iter()
            .copied()
            .filter(|id| !found.iter().any(|(f,)| f == id))
            .collect())
    }

    /// Insert a tag unless one with the same name, color or slug exists.
    ///
    /// Returns `true` if a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_if_absent(
        &self,
        name: &str,
        color: &HexColor,
        slug: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO tags (name, color, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(name)
        .bind(color)
        .bind(slug)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
