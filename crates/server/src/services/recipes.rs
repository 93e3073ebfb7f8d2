//! Recipe rules: write validation, author checks and read assembly.
//!
//! Only the author may update or delete a recipe. Writes are validated in
//! full before anything touches the database or the media directory; the
//! image is stored last and removed again if the database write fails.

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use tracing::instrument;

use foodgram_core::{Amount, CookingTime, IngredientId, RecipeId, TagId, UserId};

use super::ensure_page_within;
use super::media::{DecodedImage, MediaStore, decode_data_url};
use crate::db::{
    FollowRepository, IngredientRepository, MembershipKind, MembershipRepository,
    RecipeRepository, RepositoryError, TagRepository, UserRepository,
};
use crate::error::{AppError, Result, ValidationErrors};
use crate::models::{
    NewRecipe, PageRequest, Paginated, Recipe, RecipeDetails, RecipeFilter, User,
};
use crate::views::RecipeWrite;

/// Longest accepted recipe name.
pub const MAX_NAME_LENGTH: usize = 200;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";

/// A recipe write that passed validation, before ids are checked against
/// the database and the image is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecipe {
    pub name: String,
    pub text: String,
    pub cooking_time: CookingTime,
    /// `None` on an update that keeps the current image.
    pub image: Option<DecodedImage>,
    pub ingredients: Vec<(IngredientId, Amount)>,
    pub tags: Vec<TagId>,
}

impl ValidatedRecipe {
    fn into_new_recipe(self, image: String) -> NewRecipe {
        NewRecipe {
            name: self.name,
            text: self.text,
            cooking_time: self.cooking_time,
            image,
            ingredients: self.ingredients,
            tags: self.tags,
        }
    }
}

/// Check a recipe write without touching the database.
///
/// Every problem is reported, each under its field.
///
/// # Errors
///
/// Returns the collected [`ValidationErrors`] if any rule fails.
pub fn validate_write(
    write: &RecipeWrite,
    require_image: bool,
) -> std::result::Result<ValidatedRecipe, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let ingredients = validate_ingredients(write, &mut errors);
    let tags = validate_tags(write, &mut errors);

    let name = match write.name.as_deref().map(str::trim) {
        None => {
            errors.add("name", REQUIRED);
            None
        }
        Some("") => {
            errors.add("name", BLANK);
            None
        }
        Some(name) if name.chars().count() > MAX_NAME_LENGTH => {
            errors.add(
                "name",
                format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."),
            );
            None
        }
        Some(name) => Some(name.to_string()),
    };

    let text = match write.text.as_deref() {
        None => {
            errors.add("text", REQUIRED);
            None
        }
        Some(text) if text.trim().is_empty() => {
            errors.add("text", BLANK);
            None
        }
        Some(text) => Some(text.to_string()),
    };

    let cooking_time = match write.cooking_time {
        None => {
            errors.add("cooking_time", REQUIRED);
            None
        }
        Some(raw) => CookingTime::try_new(raw)
            .map_err(|_| {
                errors.add(
                    "cooking_time",
                    format!(
                        "Cooking time must be between {} and {} minutes.",
                        CookingTime::MIN,
                        CookingTime::MAX
                    ),
                );
            })
            .ok(),
    };

    let image = match write.image.as_deref() {
        None if require_image => {
            errors.add("image", REQUIRED);
            None
        }
        None => None,
        Some(raw) => decode_data_url(raw)
            .map_err(|e| errors.add("image", e.to_string()))
            .ok(),
    };

    match (name, text, cooking_time) {
        (Some(name), Some(text), Some(cooking_time)) if errors.is_empty() => Ok(ValidatedRecipe {
            name,
            text,
            cooking_time,
            image,
            ingredients,
            tags,
        }),
        _ => Err(errors),
    }
}

fn validate_ingredients(
    write: &RecipeWrite,
    errors: &mut ValidationErrors,
) -> Vec<(IngredientId, Amount)> {
    let Some(items) = &write.ingredients else {
        errors.add("ingredients", REQUIRED);
        return Vec::new();
    };
    if items.is_empty() {
        errors.add("ingredients", "At least one ingredient is required.");
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut repeated = false;
    let mut out_of_range = false;
    let mut valid = Vec::with_capacity(items.len());
    for item in items {
        repeated |= !seen.insert(item.id);
        match Amount::try_new(item.amount) {
            Ok(amount) => valid.push((item.id, amount)),
            Err(_) => out_of_range = true,
        }
    }

    if repeated {
        errors.add("ingredients", "Ingredients must not repeat.");
    }
    if out_of_range {
        errors.add(
            "ingredients",
            format!("Amount must be between {} and {}.", Amount::MIN, Amount::MAX),
        );
    }
    valid
}

fn validate_tags(write: &RecipeWrite, errors: &mut ValidationErrors) -> Vec<TagId> {
    let Some(tags) = &write.tags else {
        errors.add("tags", REQUIRED);
        return Vec::new();
    };
    if tags.is_empty() {
        errors.add("tags", "At least one tag is required.");
        return Vec::new();
    }

    let unique: HashSet<TagId> = tags.iter().copied().collect();
    if unique.len() != tags.len() {
        errors.add("tags", "Tags must not repeat.");
    }
    tags.clone()
}

/// Reject callers other than the recipe's author.
///
/// # Errors
///
/// Returns `AppError::Forbidden` if `caller` did not write `recipe`.
pub fn ensure_author(recipe: &Recipe, caller: UserId) -> Result<()> {
    if recipe.author_id == caller {
        Ok(())
    } else {
        Err(AppError::forbidden())
    }
}

/// Recipe service.
pub struct RecipeService<'a> {
    pool: &'a PgPool,
    media: &'a MediaStore,
}

impl<'a> RecipeService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, media: &'a MediaStore) -> Self {
        Self { pool, media }
    }

    const fn recipes(&self) -> RecipeRepository<'a> {
        RecipeRepository::new(self.pool)
    }

    /// Recipes matching `filter`, newest first.
    ///
    /// An anonymous caller asking for favorites or the cart gets an empty page.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a page past the end.
    #[instrument(skip_all, fields(caller = ?caller, page = page.page))]
    pub async fn list(
        &self,
        caller: Option<UserId>,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Paginated<RecipeDetails>> {
        if filter.is_unsatisfiable_for(caller) {
            return Ok(Paginated::empty());
        }

        let count = self.recipes().count(filter, caller).await?;
        ensure_page_within(page, count)?;

        let recipes = self
            .recipes()
            .list(filter, caller, page.limit(), page.offset())
            .await?;
        let items = self.hydrate(caller, recipes).await?;
        Ok(Paginated { count, items })
    }

    /// One recipe.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the recipe does not exist.
    pub async fn get(&self, caller: Option<UserId>, id: RecipeId) -> Result<RecipeDetails> {
        let recipe = self.load(id).await?;
        self.hydrate_one(caller, recipe).await
    }

    /// Create a recipe authored by `author`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an invalid write.
    #[instrument(skip_all, fields(author = %author))]
    pub async fn create(&self, author: UserId, write: &RecipeWrite) -> Result<RecipeDetails> {
        let valid = validate_write(write, true).map_err(AppError::Validation)?;
        self.ensure_references(&valid).await?;

        let Some(image) = &valid.image else {
            return Err(AppError::invalid("image", REQUIRED));
        };
        let stored = self.media.save(image).await?;

        let recipe = match self
            .recipes()
            .create(author, &valid.into_new_recipe(stored.clone()))
            .await
        {
            Ok(recipe) => recipe,
            Err(e) => {
                self.media.remove(&stored).await;
                return Err(e.into());
            }
        };

        tracing::info!(recipe_id = %recipe.id, "Recipe created");
        self.hydrate_one(Some(author), recipe).await
    }

    /// Replace a recipe's contents. The tag and ingredient sets are replaced
    /// wholesale; the image is kept when the write carries none.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the recipe does not exist,
    /// `AppError::Forbidden` if `caller` is not its author, and
    /// `AppError::Validation` for an invalid write.
    #[instrument(skip_all, fields(caller = %caller, recipe_id = %id))]
    pub async fn update(
        &self,
        caller: UserId,
        id: RecipeId,
        write: &RecipeWrite,
    ) -> Result<RecipeDetails> {
        let existing = self.load(id).await?;
        ensure_author(&existing, caller)?;

        let valid = validate_write(write, false).map_err(AppError::Validation)?;
        self.ensure_references(&valid).await?;

        let replacement = match &valid.image {
            Some(image) => Some(self.media.save(image).await?),
            None => None,
        };
        let image = replacement.clone().unwrap_or_else(|| existing.image.clone());

        let recipe = match self
            .recipes()
            .update(id, &valid.into_new_recipe(image))
            .await
        {
            Ok(recipe) => recipe,
            Err(e) => {
                if let Some(stored) = &replacement {
                    self.media.remove(stored).await;
                }
                return Err(e.into());
            }
        };
        if replacement.is_some() {
            self.media.remove(&existing.image).await;
        }

        tracing::info!("Recipe updated");
        self.hydrate_one(Some(caller), recipe).await
    }

    /// Delete a recipe and everything that references it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the recipe does not exist, or
    /// `AppError::Forbidden` if `caller` is not its author.
    #[instrument(skip_all, fields(caller = %caller, recipe_id = %id))]
    pub async fn delete(&self, caller: UserId, id: RecipeId) -> Result<()> {
        let existing = self.load(id).await?;
        ensure_author(&existing, caller)?;

        let image = self.recipes().delete(id).await?;
        self.media.remove(&image).await;

        tracing::info!("Recipe deleted");
        Ok(())
    }

    async fn load(&self, id: RecipeId) -> Result<Recipe> {
        self.recipes()
            .get(id)
            .await?
            .ok_or_else(AppError::not_found)
    }

    /// Report tag and ingredient ids that have no row.
    async fn ensure_references(&self, valid: &ValidatedRecipe) -> Result<()> {
        let ingredient_ids: Vec<IngredientId> = valid.ingredients.iter().map(|(id, _)| *id).collect();
        let tags = TagRepository::new(self.pool);
        let ingredients = IngredientRepository::new(self.pool);
        let (missing_tags, missing_ingredients) = tokio::try_join!(
            tags.missing(&valid.tags),
            ingredients.missing(&ingredient_ids),
        )?;

        let mut errors = ValidationErrors::new();
        for id in missing_ingredients {
            errors.add("ingredients", format!("Ingredient with id {id} does not exist."));
        }
        for id in missing_tags {
            errors.add("tags", format!("Tag with id {id} does not exist."));
        }
        errors.into_result()
    }

    async fn hydrate_one(&self, caller: Option<UserId>, recipe: Recipe) -> Result<RecipeDetails> {
        self.hydrate(caller, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("recipe vanished while loading".to_string()))
    }

    /// Attach authors, tags, ingredients and the caller's flags to recipes,
    /// keeping their order.
    async fn hydrate(
        &self,
        caller: Option<UserId>,
        recipes: Vec<Recipe>,
    ) -> Result<Vec<RecipeDetails>> {
        let ids: Vec<RecipeId> = recipes.iter().map(|r| r.id).collect();
        let mut author_ids: Vec<UserId> = recipes.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable_by_key(UserId::as_i32);
        author_ids.dedup();

        let recipes_repo = self.recipes();
        let users = UserRepository::new(self.pool);
        let (authors, mut tags, mut ingredients) = tokio::try_join!(
            users.get_many(&author_ids),
            recipes_repo.tags_for(&ids),
            recipes_repo.ingredients_for(&ids),
        )?;
        let authors: HashMap<UserId, User> = authors.into_iter().map(|u| (u.id, u)).collect();

        let follows = FollowRepository::new(self.pool);
        let favorites = MembershipRepository::new(self.pool, MembershipKind::Favorite);
        let cart = MembershipRepository::new(self.pool, MembershipKind::ShoppingCart);
        let (followed, favorited, in_cart) = match caller {
            Some(user) => tokio::try_join!(
                follows.followed_among(user, &author_ids),
                favorites.recipes_among(user, &ids),
                cart.recipes_among(user, &ids),
            )?,
            None => Default::default(),
        };

        recipes
            .into_iter()
            .map(|recipe| -> Result<RecipeDetails> {
                let author = authors.get(&recipe.author_id).cloned().ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "recipe {} references missing author {}",
                        recipe.id, recipe.author_id
                    ))
                })?;
                Ok(RecipeDetails {
                    author_is_subscribed: followed.contains(&author.id),
                    author,
                    tags: tags.remove(&recipe.id).unwrap_or_default(),
                    ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    recipe,
                })
            })
            .collect()
    }
}
