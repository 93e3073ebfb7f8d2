//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, token login/logout, password changes
//! - `recipes` - Recipe validation, authorization and persistence
//! - `memberships` - Favorites, shopping cart and the shopping list
//! - `follows` - Subscriptions between users
//! - `users` - Profiles with the caller's subscription flag
//! - `media` - Recipe image decoding and storage
//!
//! Services take the caller as an explicit `UserId` (or `Option<UserId>` for
//! reads that anonymous callers may perform) and return [`AppError`]s the
//! routes pass straight through.

pub mod auth;
pub mod follows;
pub mod media;
pub mod memberships;
pub mod recipes;
pub mod users;

pub use auth::{AuthError, AuthService, Registration};
pub use follows::FollowService;
pub use memberships::MembershipService;
pub use recipes::RecipeService;
pub use users::UserService;

use crate::error::AppError;
use crate::models::PageRequest;

/// Reject pages past the end of a listing of `count` rows.
pub(crate) fn ensure_page_within(page: PageRequest, count: i64) -> Result<(), AppError> {
    if page.is_within(count) {
        Ok(())
    } else {
        Err(AppError::NotFound("Invalid page.".to_string()))
    }
}
