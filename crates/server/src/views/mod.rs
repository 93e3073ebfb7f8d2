//! JSON shapes of the API.
//!
//! Read views are built from domain models; write views are deserialized
//! from request bodies and validated by the services. Image paths become
//! absolute URLs here, so every view that carries an image takes the
//! [`MediaStore`](crate::services::media::MediaStore).

pub mod page;
pub mod recipe;
pub mod user;

pub use page::Page;
pub use recipe::{
    IngredientAmountWrite, IngredientView, RecipeIngredientView, RecipeSummaryView, RecipeView,
    RecipeWrite, TagView,
};
pub use user::{RegisteredUserView, SubscriptionView, UserView};
