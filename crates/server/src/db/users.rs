//! User repository for database operations.

use sqlx::PgPool;

use foodgram_core::{Email, UserId};

use super::{RepositoryError, id_array, map_unique_violation};
use crate::models::{NewUser, User};

#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, username, first_name, last_name, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get several users at once. Missing ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, username, first_name, last_name, created_at
            FROM users
            WHERE id = ANY($1)
            ",
        )
        .bind(id_array(ids))
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Get a user and their password hash by email (for login).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHash>(
            r"
            SELECT id, email, username, first_name, last_name, created_at, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Get the password hash of a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn get_password_hash(&self, id: UserId) -> Result<String, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| r.0).ok_or(RepositoryError::NotFound)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict("email")` or `Conflict("username")`
    /// if either is taken.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (email, username, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, username, first_name, last_name, created_at
            ",
        )
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, |constraint| match constraint {
                "users_email_key" => Some("email".to_owned()),
                "users_username_key" => Some("username".to_owned()),
                _ => None,
            })
        })
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List users ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, username, first_name, last_name, created_at
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(row.0)
    }

    /// Delete a user and everything they own, in one transaction.
    ///
    /// Removes the user's recipes (with their join rows and other users'
    /// memberships on them), the user's own favorites and cart entries,
    /// follows in both directions, and the API token.
    ///
    /// Returns the image paths of the deleted recipes so the caller can remove
    /// the files, or `None` if no user has this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// deleted in that case.
    pub async fn delete_cascade(&self, email: &Email) -> Result<Option<Vec<String>>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user: Option<(UserId,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1 FOR UPDATE")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;
        let Some((user_id,)) = user else {
            return Ok(None);
        };

        let recipe_ids: Vec<(i32,)> = sqlx::query_as("SELECT id FROM recipes WHERE author_id = $1")
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await?;
        let recipe_ids: Vec<i32> = recipe_ids.into_iter().map(|r| r.0).collect();

        for statement in [
            "DELETE FROM favorites WHERE recipe_id = ANY($1)",
            "DELETE FROM shopping_cart WHERE recipe_id = ANY($1)",
            "DELETE FROM recipe_tags WHERE recipe_id = ANY($1)",
            "DELETE FROM recipe_ingredients WHERE recipe_id = ANY($1)",
        ] {
            sqlx::query(statement)
                .bind(&recipe_ids)
                .execute(&mut *tx)
                .await?;
        }

        let images: Vec<(String,)> =
            sqlx::query_as("DELETE FROM recipes WHERE author_id = $1 RETURNING image")
                .bind(user_id)
                .fetch_all(&mut *tx)
                .await?;

        for statement in [
            "DELETE FROM favorites WHERE user_id = $1",
            "DELETE FROM shopping_cart WHERE user_id = $1",
            "DELETE FROM follows WHERE user_id = $1 OR author_id = $1",
            "DELETE FROM auth_tokens WHERE user_id = $1",
            "DELETE FROM users WHERE id = $1",
        ] {
            sqlx::query(statement)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Some(images.into_iter().map(|r| r.0).collect()))
    }
}
