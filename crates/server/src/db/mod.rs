//! Database operations for the Foodgram `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users`, `auth_tokens` - Accounts and API tokens
//! - `follows` - Follower → author subscriptions
//! - `tags`, `ingredients` - Seeded reference data
//! - `recipes`, `recipe_ingredients`, `recipe_tags` - Recipes and their join rows
//! - `favorites`, `shopping_cart` - Membership rows linking users to recipes
//!
//! Foreign keys are `RESTRICT`; the repositories delete dependent rows
//! explicitly inside the parent's transaction.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p foodgram-cli -- migrate
//! ```

pub mod follows;
pub mod ingredients;
pub mod memberships;
pub mod recipes;
pub mod tags;
pub mod tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use follows::FollowRepository;
pub use ingredients::IngredientRepository;
pub use memberships::{MembershipKind, MembershipRepository};
pub use recipes::RecipeRepository;
pub use tags::TagRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation. Carries a message naming what already exists.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Translate a unique violation into [`RepositoryError::Conflict`].
///
/// `describe` maps the violated constraint name to a message; constraints it
/// does not recognise stay database errors.
pub(crate) fn map_unique_violation(
    err: sqlx::Error,
    describe: impl FnOnce(&str) -> Option<String>,
) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
        && let Some(message) = db_err.constraint().and_then(describe)
    {
        return RepositoryError::Conflict(message);
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create a pool that connects on first use.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL cannot be parsed.
pub fn create_lazy_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy(database_url.expose_secret())
}

/// Convert typed ids into the `i32` array Postgres expects for `ANY($n)` and `UNNEST`.
pub(crate) fn id_array<T: Copy + Into<i32>>(ids: &[T]) -> Vec<i32> {
    ids.iter().copied().map(Into::into).collect()
}
