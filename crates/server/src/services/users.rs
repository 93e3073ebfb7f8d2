//! User profile reads.

use std::collections::HashSet;

use sqlx::PgPool;

use foodgram_core::UserId;

use super::ensure_page_within;
use crate::db::{FollowRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{PageRequest, Paginated, Profile, User};

/// Service for listing and viewing users.
pub struct UserService<'a> {
    users: UserRepository<'a>,
    follows: FollowRepository<'a>,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            follows: FollowRepository::new(pool),
        }
    }

    /// Users ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a page past the end.
    pub async fn list(&self, caller: Option<UserId>, page: PageRequest) -> Result<Paginated<Profile>> {
        let count = self.users.count().await?;
        ensure_page_within(page, count)?;

        let users = self.users.list(page.limit(), page.offset()).await?;
        let items = self.profiles(caller, users).await?;
        Ok(Paginated { count, items })
    }

    /// One user's profile.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user does not exist.
    pub async fn get(&self, caller: Option<UserId>, id: UserId) -> Result<Profile> {
        let user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(AppError::not_found)?;
        let is_subscribed = match caller {
            Some(follower) => self.follows.exists(follower, id).await?,
            None => false,
        };
        Ok(Profile {
            user,
            is_subscribed,
        })
    }

    async fn profiles(&self, caller: Option<UserId>, users: Vec<User>) -> Result<Vec<Profile>> {
        let followed: HashSet<UserId> = match caller {
            Some(follower) => {
                let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
                self.follows.followed_among(follower, &ids).await?
            }
            None => HashSet::new(),
        };

        Ok(users
            .into_iter()
            .map(|user| Profile {
                is_subscribed: followed.contains(&user.id),
                user,
            })
            .collect())
    }
}
