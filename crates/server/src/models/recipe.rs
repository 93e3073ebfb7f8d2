//! Recipe domain types.

use chrono::{DateTime, Utc};

use foodgram_core::{Amount, CookingTime, IngredientId, RecipeId, TagId, UserId};

use super::{Tag, User};

/// A recipe row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Recipe {
    pub id: RecipeId,
    pub author_id: UserId,
    pub name: String,
    pub text: String,
    pub cooking_time: CookingTime,
    /// Image path relative to the media root.
    pub image: String,
    pub pub_date: DateTime<Utc>,
}

/// The short form of a recipe returned by membership toggles and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub image: String,
    pub cooking_time: CookingTime,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// One ingredient of a recipe together with its amount.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RecipeIngredientLine {
    pub recipe_id: RecipeId,
    /// Ingredient id.
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
    pub amount: Amount,
}

/// Validated recipe contents, ready to be written.
///
/// Ingredient and tag ids are unique and known to exist. Used for both create
/// and update; an update replaces the tag and ingredient sets wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub name: String,
    pub text: String,
    pub cooking_time: CookingTime,
    pub image: String,
    pub ingredients: Vec<(IngredientId, Amount)>,
    pub tags: Vec<TagId>,
}

/// Narrowing applied to the recipe listing.
///
/// Dimensions combine with AND. Several authors, or several tag slugs,
/// within one dimension combine with OR.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub authors: Vec<UserId>,
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeFilter {
    /// Whether this filter can match nothing for the given caller.
    ///
    /// An anonymous caller has no favorites and no cart.
    #[must_use]
    pub const fn is_unsatisfiable_for(&self, caller: Option<UserId>) -> bool {
        caller.is_none() && (self.is_favorited || self.is_in_shopping_cart)
    }
}

/// A recipe with everything its read view needs.
#[derive(Debug, Clone)]
pub struct RecipeDetails {
    pub recipe: Recipe,
    pub author: User,
    /// Whether the caller follows the author.
    pub author_is_subscribed: bool,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredientLine>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}
