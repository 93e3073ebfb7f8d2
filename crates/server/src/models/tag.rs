//! Tag reference data.

use foodgram_core::{HexColor, TagId};

/// A recipe tag (breakfast, lunch, ...). Name, color and slug are unique.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: HexColor,
    pub slug: String,
}
