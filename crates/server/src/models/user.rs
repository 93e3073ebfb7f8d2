//! User domain types.

use chrono::{DateTime, Utc};

use foodgram_core::{Email, UserId, Username};

use super::RecipeSummary;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// Validated registration data, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// The authenticated caller of a request, resolved from an API token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// Token the request was authenticated with (revoked on logout).
    pub token: String,
}

impl CurrentUser {
    /// The caller's user id.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.user.id
    }
}

/// A user as seen by a (possibly anonymous) caller.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    /// Whether the caller follows this user.
    pub is_subscribed: bool,
}

/// A followed author with their newest recipes.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub author: User,
    /// Newest first, capped by the caller's `recipes_limit`.
    pub recipes: Vec<RecipeSummary>,
    /// All of the author's recipes, regardless of the cap.
    pub recipes_count: i64,
}
