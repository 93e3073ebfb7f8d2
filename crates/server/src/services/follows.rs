//! Subscriptions: following authors and listing followed authors.

use sqlx::PgPool;
use tracing::instrument;

use foodgram_core::UserId;

use super::ensure_page_within;
use crate::db::{FollowRepository, RecipeRepository, UserRepository};
use crate::error::{AppError, Result, ValidationErrors};
use crate::models::{PageRequest, Paginated, Subscription, User};

/// Service for follow toggles and the subscriptions listing.
pub struct FollowService<'a> {
    pool: &'a PgPool,
}

impl<'a> FollowService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Follow `author`.
    ///
    /// `recipes_limit` caps the recipe preview in the returned subscription.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when following yourself,
    /// `AppError::NotFound` if the author does not exist and
    /// `AppError::Conflict` if already following.
    #[instrument(skip_all, fields(follower = %follower, author = %author))]
    pub async fn subscribe(
        &self,
        follower: UserId,
        author: UserId,
        recipes_limit: Option<i64>,
    ) -> Result<Subscription> {
        if follower == author {
            return Err(AppError::invalid(
                ValidationErrors::NON_FIELD,
                "You cannot follow yourself.",
            ));
        }
        let author = self.load_author(author).await?;

        FollowRepository::new(self.pool)
            .add(follower, author.id)
            .await?;
        tracing::info!("Subscribed");

        self.subscriptions_for(vec![author], recipes_limit)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("subscription vanished while loading".to_string()))
    }

    /// Stop following `author`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the author does not exist or is not
    /// followed.
    #[instrument(skip_all, fields(follower = %follower, author = %author))]
    pub async fn unsubscribe(&self, follower: UserId, author: UserId) -> Result<()> {
        self.load_author(author).await?;

        let removed = FollowRepository::new(self.pool)
            .remove(follower, author)
            .await?;
        if removed {
            tracing::info!("Unsubscribed");
            Ok(())
        } else {
            Err(AppError::NotFound(
                "You are not subscribed to this author.".to_string(),
            ))
        }
    }

    /// Authors the follower follows, most recently registered first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a page past the end.
    pub async fn subscriptions(
        &self,
        follower: UserId,
        page: PageRequest,
        recipes_limit: Option<i64>,
    ) -> Result<Paginated<Subscription>> {
        let follows = FollowRepository::new(self.pool);
        let count = follows.count_authors(follower).await?;
        ensure_page_within(page, count)?;

        let authors = follows
            .list_authors(follower, page.limit(), page.offset())
            .await?;
        let items = self.subscriptions_for(authors, recipes_limit).await?;
        Ok(Paginated { count, items })
    }

    async fn load_author(&self, id: UserId) -> Result<User> {
        UserRepository::new(self.pool)
            .get_by_id(id)
            .await?
            .ok_or_else(AppError::not_found)
    }

    async fn subscriptions_for(
        &self,
        authors: Vec<User>,
        recipes_limit: Option<i64>,
    ) -> Result<Vec<Subscription>> {
        let ids: Vec<UserId> = authors.iter().map(|a| a.id).collect();
        let recipes = RecipeRepository::new(self.pool);
        let (mut previews, counts) = tokio::try_join!(
            recipes.summaries_by_authors(&ids, recipes_limit),
            recipes.count_by_authors(&ids),
        )?;

        Ok(authors
            .into_iter()
            .map(|author| Subscription {
                recipes: previews.remove(&author.id).unwrap_or_default(),
                recipes_count: counts.get(&author.id).copied().unwrap_or(0),
                author,
            })
            .collect())
    }
}
