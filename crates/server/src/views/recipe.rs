//! Recipe, tag and ingredient views.

use serde::{Deserialize, Serialize};

use foodgram_core::{Amount, CookingTime, HexColor, IngredientId, RecipeId, TagId};

use super::UserView;
use crate::models::{Ingredient, RecipeDetails, RecipeIngredientLine, RecipeSummary, Tag};
use crate::services::media::MediaStore;

#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub id: TagId,
    pub name: String,
    pub color: HexColor,
    pub slug: String,
}

impl From<&Tag> for TagView {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
            color: tag.color.clone(),
            slug: tag.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngredientView {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

impl From<&Ingredient> for IngredientView {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name.clone(),
            measurement_unit: ingredient.measurement_unit.clone(),
        }
    }
}

/// An ingredient inside a recipe, with its amount.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeIngredientView {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
    pub amount: Amount,
}

impl From<&RecipeIngredientLine> for RecipeIngredientView {
    fn from(line: &RecipeIngredientLine) -> Self {
        Self {
            id: line.id,
            name: line.name.clone(),
            measurement_unit: line.measurement_unit.clone(),
            amount: line.amount,
        }
    }
}

/// Full recipe read view.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
    pub id: RecipeId,
    pub tags: Vec<TagView>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: CookingTime,
}

impl RecipeView {
    #[must_use]
    pub fn new(details: &RecipeDetails, media: &MediaStore) -> Self {
        let recipe = &details.recipe;
        Self {
            id: recipe.id,
            tags: details.tags.iter().map(TagView::from).collect(),
            author: UserView::new(&details.author, details.author_is_subscribed),
            ingredients: details
                .ingredients
                .iter()
                .map(RecipeIngredientView::from)
                .collect(),
            is_favorited: details.is_favorited,
            is_in_shopping_cart: details.is_in_shopping_cart,
            name: recipe.name.clone(),
            image: media.url(&recipe.image),
            text: recipe.text.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Short recipe view used by favorites, the cart and subscriptions.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummaryView {
    pub id: RecipeId,
    pub name: String,
    pub image: String,
    pub cooking_time: CookingTime,
}

impl RecipeSummaryView {
    #[must_use]
    pub fn new(summary: &RecipeSummary, media: &MediaStore) -> Self {
        Self {
            id: summary.id,
            name: summary.name.clone(),
            image: media.url(&summary.image),
            cooking_time: summary.cooking_time,
        }
    }
}

/// One `{id, amount}` entry of a recipe write.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmountWrite {
    pub id: IngredientId,
    pub amount: i64,
}

/// Body of recipe create and update requests.
///
/// Every field is optional at the JSON level so missing fields are reported
/// per field by validation rather than as a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeWrite {
    pub ingredients: Option<Vec<IngredientAmountWrite>>,
    pub tags: Option<Vec<TagId>>,
    /// Base64 data URL.
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}
