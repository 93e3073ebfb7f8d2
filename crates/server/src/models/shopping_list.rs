//! Consolidated shopping list.

/// Total amount of one ingredient across every recipe in a cart.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShoppingListEntry {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// A user's shopping list, one entry per ingredient, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    pub entries: Vec<ShoppingListEntry>,
}

impl ShoppingList {
    /// First line of the rendered file.
    pub const HEADER: &'static str = "Shopping list";

    /// Attachment filename for the download.
    pub const FILENAME: &'static str = "shopping_list.txt";

    /// Render as plain text: the header, then `"<name>, <total> <unit>"` per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", Self::HEADER);
        for entry in &self.entries {
            out.push_str(&format!(
                "{}, {} {}\n",
                entry.name, entry.total, entry.measurement_unit
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, total: i64, unit: &str) -> ShoppingListEntry {
        ShoppingListEntry {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            total,
        }
    }

    #[test]
    fn test_empty_list_renders_header_only() {
        let list = ShoppingList::default();
        assert_eq!(list.render(), "Shopping list\n");
    }

    #[test]
    fn test_render_lines() {
        let list = ShoppingList {
            entries: vec![entry("Salt", 5, "g"), entry("Water", 200, "g")],
        };
        let rendered = list.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, ["Shopping list", "Salt, 5 g", "Water, 200 g"]);
    }

    #[test]
    fn test_render_ends_every_line_with_newline() {
        let list = ShoppingList {
            entries: vec![entry("Carrot", 2, "pcs")],
        };
        assert_eq!(list.render(), "Shopping list\nCarrot, 2 pcs\n");
    }
}
