//! User views.

use serde::Serialize;

use foodgram_core::{Email, UserId, Username};

use super::RecipeSummaryView;
use crate::models::{Profile, Subscription, User};
use crate::services::media::MediaStore;

/// A user as seen by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub email: Email,
    pub id: UserId,
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserView {
    #[must_use]
    pub fn new(user: &User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

impl From<&Profile> for UserView {
    fn from(profile: &Profile) -> Self {
        Self::new(&profile.user, profile.is_subscribed)
    }
}

/// Response to registration: the profile without `is_subscribed`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUserView {
    pub email: Email,
    pub id: UserId,
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for RegisteredUserView {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub user: UserView,
    pub recipes: Vec<RecipeSummaryView>,
    pub recipes_count: i64,
}

impl SubscriptionView {
    #[must_use]
    pub fn new(subscription: &Subscription, media: &MediaStore) -> Self {
        Self {
            user: UserView::new(&subscription.author, true),
            recipes: subscription
                .recipes
                .iter()
                .map(|r| RecipeSummaryView::new(r, media))
                .collect(),
            recipes_count: subscription.recipes_count,
        }
    }
}
