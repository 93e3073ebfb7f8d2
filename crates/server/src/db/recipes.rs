//! Recipe repository.
//!
//! A recipe owns its `recipe_ingredients` and `recipe_tags` rows. Create and
//! update write the recipe and both join sets in one transaction, so a failed
//! write leaves nothing behind.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use foodgram_core::{RecipeId, UserId};

use super::{RepositoryError, id_array};
use crate::models::{
    NewRecipe, Recipe, RecipeFilter, RecipeIngredientLine, RecipeSummary, ShoppingList,
    ShoppingListEntry, Tag,
};

const RECIPE_COLUMNS: &str = "r.id, r.author_id, r.name, r.text, r.cooking_time, r.image, r.pub_date";

#[derive(sqlx::FromRow)]
struct RecipeTagRow {
    recipe_id: RecipeId,
    #[sqlx(flatten)]
    tag: Tag,
}

#[derive(sqlx::FromRow)]
struct AuthoredSummary {
    author_id: UserId,
    #[sqlx(flatten)]
    summary: RecipeSummary,
}

/// Repository for recipes and their join rows.
pub struct RecipeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RecipeRepository<'a> {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a recipe by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(recipe)
    }

    /// List recipes matching `filter`, newest first.
    ///
    /// `caller` resolves the favorite and shopping-cart flags; without a
    /// caller those flags match nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &RecipeFilter,
        caller: Option<UserId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r"
        ));
        push_filters(&mut query, filter, caller);
        query
            .push(" ORDER BY r.pub_date DESC, r.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let recipes = query
            .build_query_as::<Recipe>()
            .fetch_all(self.pool)
            .await?;

        Ok(recipes)
    }

    /// Count recipes matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(
        &self,
        filter: &RecipeFilter,
        caller: Option<UserId>,
    ) -> Result<i64, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r");
        push_filters(&mut query, filter, caller);

        let row: (i64,) = query.build_query_as::<(i64,)>().fetch_one(self.pool).await?;
        Ok(row.0)
    }

    /// Tags of several recipes, keyed by recipe. Each list is ordered by tag name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tags_for(
        &self,
        recipes: &[RecipeId],
    ) -> Result<HashMap<RecipeId, Vec<Tag>>, RepositoryError> {
        if recipes.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, RecipeTagRow>(
            r"
            SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
            FROM recipe_tags rt
            INNER JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.name
            ",
        )
        .bind(id_array(recipes))
        .fetch_all(self.pool)
        .await?;

        let mut by_recipe: HashMap<RecipeId, Vec<Tag>> = HashMap::new();
        for row in rows {
            by_recipe.entry(row.recipe_id).or_default().push(row.tag);
        }
        Ok(by_recipe)
    }

    /// Ingredient lines of several recipes, keyed by recipe, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ingredients_for(
        &self,
        recipes: &[RecipeId],
    ) -> Result<HashMap<RecipeId, Vec<RecipeIngredientLine>>, RepositoryError> {
        if recipes.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, RecipeIngredientLine>(
            r"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            INNER JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.id
            ",
        )
        .bind(id_array(recipes))
        .fetch_all(self.pool)
        .await?;

        let mut by_recipe: HashMap<RecipeId, Vec<RecipeIngredientLine>> = HashMap::new();
        for line in rows {
            by_recipe.entry(line.recipe_id).or_default().push(line);
        }
        Ok(by_recipe)
    }

    /// Insert a recipe with its ingredient and tag rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; the whole
    /// write is rolled back.
    pub async fn create(
        &self,
        author: UserId,
        recipe: &NewRecipe,
    ) -> Result<Recipe, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Recipe>(
            r"
            INSERT INTO recipes (author_id, name, text, cooking_time, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, name, text, cooking_time, image, pub_date
            ",
        )
        .bind(author)
        .bind(&recipe.name)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(&recipe.image)
        .fetch_one(&mut *tx)
        .await?;

        insert_children(&mut tx, created.id, recipe).await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Replace a recipe's fields and its ingredient and tag sets.
    ///
    /// The publication date is refreshed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipe does not exist, or
    /// `RepositoryError::Database` if a statement fails (nothing is changed).
    pub async fn update(&self, id: RecipeId, recipe: &NewRecipe) -> Result<Recipe, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Recipe>(
            r"
            UPDATE recipes
            SET name = $2, text = $3, cooking_time = $4, image = $5, pub_date = NOW()
            WHERE id = $1
            RETURNING id, author_id, name, text, cooking_time, image, pub_date
            ",
        )
        .bind(id)
        .bind(&recipe.name)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(&recipe.image)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        for statement in [
            "DELETE FROM recipe_ingredients WHERE recipe_id = $1",
            "DELETE FROM recipe_tags WHERE recipe_id = $1",
        ] {
            sqlx::query(statement).bind(id).execute(&mut *tx).await?;
        }
        insert_children(&mut tx, id, recipe).await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a recipe together with its join rows and every favorite and
    /// cart entry pointing at it.
    ///
    /// Returns the image path so the caller can remove the file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipe does not exist.
    pub async fn delete(&self, id: RecipeId) -> Result<String, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for statement in [
            "DELETE FROM favorites WHERE recipe_id = $1",
            "DELETE FROM shopping_cart WHERE recipe_id = $1",
            "DELETE FROM recipe_tags WHERE recipe_id = $1",
            "DELETE FROM recipe_ingredients WHERE recipe_id = $1",
        ] {
            sqlx::query(statement).bind(id).execute(&mut *tx).await?;
        }

        let row: Option<(String,)> =
            sqlx::query_as("DELETE FROM recipes WHERE id = $1 RETURNING image")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((image,)) = row else {
            return Err(RepositoryError::NotFound);
        };

        tx.commit().await?;
        Ok(image)
    }

    /// Newest recipes of each author, at most `per_author` each when given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summaries_by_authors(
        &self,
        authors: &[UserId],
        per_author: Option<i64>,
    ) -> Result<HashMap<UserId, Vec<RecipeSummary>>, RepositoryError> {
        if authors.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, AuthoredSummary>(
            r"
            SELECT author_id, id, name, image, cooking_time
            FROM (
                SELECT r.author_id, r.id, r.name, r.image, r.cooking_time,
                       ROW_NUMBER() OVER (
                           PARTITION BY r.author_id ORDER BY r.pub_date DESC, r.id DESC
                       ) AS position
                FROM recipes r
                WHERE r.author_id = ANY($1)
            ) ranked
            WHERE $2::BIGINT IS NULL OR position <= $2
            ORDER BY author_id, position
            ",
        )
        .bind(id_array(authors))
        .bind(per_author)
        .fetch_all(self.pool)
        .await?;

        let mut by_author: HashMap<UserId, Vec<RecipeSummary>> = HashMap::new();
        for row in rows {
            by_author.entry(row.author_id).or_default().push(row.summary);
        }
        Ok(by_author)
    }

    /// Total recipe count of each author. Authors without recipes are absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_authors(
        &self,
        authors: &[UserId],
    ) -> Result<HashMap<UserId, i64>, RepositoryError> {
        if authors.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(UserId, i64)> = sqlx::query_as(
            r"
            SELECT author_id, COUNT(*)
            FROM recipes
            WHERE author_id = ANY($1)
            GROUP BY author_id
            ",
        )
        .bind(id_array(authors))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Sum the ingredient amounts of every recipe in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shopping_list(&self, user: UserId) -> Result<ShoppingList, RepositoryError> {
        let entries = sqlx::query_as::<_, ShoppingListEntry>(
            r"
            SELECT i.name, i.measurement_unit, SUM(ri.amount)::BIGINT AS total
            FROM shopping_cart sc
            INNER JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
            INNER JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = $1
            GROUP BY i.id, i.name, i.measurement_unit
            ORDER BY i.name, i.measurement_unit
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(ShoppingList { entries })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn push_filters(
    query: &mut QueryBuilder<'_, Postgres>,
    filter: &RecipeFilter,
    caller: Option<UserId>,
) {
    query.push(" WHERE TRUE");

    if !filter.authors.is_empty() {
        query
            .push(" AND r.author_id = ANY(")
            .push_bind(id_array(&filter.authors))
            .push(")");
    }

    if !filter.tags.is_empty() {
        query
            .push(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id \
                 WHERE rt.recipe_id = r.id AND t.slug = ANY(",
            )
            .push_bind(filter.tags.clone())
            .push("))");
    }

    for (enabled, table) in [
        (filter.is_favorited, "favorites"),
        (filter.is_in_shopping_cart, "shopping_cart"),
    ] {
        if !enabled {
            continue;
        }
        match caller {
            Some(user) => {
                query
                    .push(format!(
                        " AND EXISTS (SELECT 1 FROM {table} m WHERE m.recipe_id = r.id AND m.user_id = "
                    ))
                    .push_bind(user)
                    .push(")");
            }
            None => {
                query.push(" AND FALSE");
            }
        }
    }
}

async fn insert_children(
    conn: &mut PgConnection,
    recipe_id: RecipeId,
    recipe: &NewRecipe,
) -> Result<(), RepositoryError> {
    let (ingredient_ids, amounts): (Vec<i32>, Vec<i32>) = recipe
        .ingredients
        .iter()
        .map(|(id, amount)| (id.as_i32(), amount.get()))
        .unzip();

    sqlx::query(
        r"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
        SELECT $1, ingredient_id, amount
        FROM UNNEST($2::INT4[], $3::INT4[]) AS t (ingredient_id, amount)
        ",
    )
    .bind(recipe_id)
    .bind(ingredient_ids)
    .bind(amounts)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r"
        INSERT INTO recipe_tags (recipe_id, tag_id)
        SELECT $1, tag_id
        FROM UNNEST($2::INT4[]) AS t (tag_id)
        ",
    )
    .bind(recipe_id)
    .bind(id_array(&recipe.tags))
    .execute(&mut *conn)
    .await?;

    Ok(())
}
