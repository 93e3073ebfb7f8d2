//! Domain models for the API.
//!
//! These are validated domain objects and database rows. The JSON shapes the
//! frontend sees live in [`crate::views`].

pub mod ingredient;
pub mod page;
pub mod recipe;
pub mod shopping_list;
pub mod tag;
pub mod user;

pub use ingredient::Ingredient;
pub use page::{PageRequest, Paginated};
pub use recipe::{
    NewRecipe, Recipe, RecipeDetails, RecipeFilter, RecipeIngredientLine, RecipeSummary,
};
pub use shopping_list::{ShoppingList, ShoppingListEntry};
pub use tag::Tag;
pub use user::{CurrentUser, NewUser, Profile, Subscription, User};
