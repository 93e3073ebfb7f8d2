//! Ingredient reference data.

use foodgram_core::IngredientId;

/// An ingredient with its measurement unit. Unique per `(name, measurement_unit)`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}
