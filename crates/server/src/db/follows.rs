//! Follow (subscription) repository.

use std::collections::HashSet;

use sqlx::PgPool;

use foodgram_core::UserId;

use super::{RepositoryError, id_array, map_unique_violation};
use crate::models::User;

/// Repository for follower → author relations.
pub struct FollowRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FollowRepository<'a> {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether `follower` follows `author`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, follower: UserId, author: UserId) -> Result<bool, RepositoryError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(follower)
        .bind(author)
        .fetch_one(self.pool)
        .await?;
        Ok(row.0)
    }

    /// Insert the relation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if it already exists.
    pub async fn add(&self, follower: UserId, author: UserId) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO follows (user_id, author_id) VALUES ($1, $2)")
            .bind(follower)
            .bind(author)
            .execute(self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(e, |constraint| {
                    (constraint == "follows_unique_pair")
                        .then(|| "You are already subscribed to this author.".to_owned())
                })
            })?;
        Ok(())
    }

    /// Delete the relation. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, follower: UserId, author: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(follower)
            .bind(author)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Which of `authors` the follower follows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn followed_among(
        &self,
        follower: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, RepositoryError> {
        if authors.is_empty() {
            return Ok(HashSet::new());
        }
        let rows: Vec<(UserId,)> = sqlx::query_as(
            "SELECT author_id FROM follows WHERE user_id = $1 AND author_id = ANY($2)",
        )
        .bind(follower)
        .bind(id_array(authors))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Authors the follower follows, newest author id first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_authors(
        &self,
        follower: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.created_at
            FROM follows f
            INNER JOIN users u ON u.id = f.author_id
            WHERE f.user_id = $1
            ORDER BY f.author_id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(follower)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }

    /// Number of authors the follower follows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_authors(&self, follower: UserId) -> Result<i64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE user_id = $1")
            .bind(follower)
            .fetch_one(self.pool)
            .await?;
        Ok(row.0)
    }
}
