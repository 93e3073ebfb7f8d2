//! Reference data loading.
//!
//! Both loaders are idempotent: rows that already exist are left alone, so
//! a fixture file can be applied again after it grows.

use std::path::Path;

use serde::Deserialize;

use foodgram_core::HexColor;
use foodgram_server::db::{IngredientRepository, TagRepository};

use super::{CommandError, connect};

/// One tag row from the CSV fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRow {
    pub name: String,
    pub color: HexColor,
    pub slug: String,
}

/// One ingredient from the JSON fixture.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngredientRow {
    pub name: String,
    pub measurement_unit: String,
}

/// Parse `name,color,slug` rows. Fields may be quoted.
///
/// Rows without exactly three fields, with an empty field, or with a color
/// that is not hex are skipped and counted.
pub fn parse_tags(csv: &str) -> (Vec<TagRow>, usize) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv.as_bytes());

    let mut rows = Vec::new();
    let mut skipped = 0;

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable tag row");
                skipped += 1;
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        let (Some(name), Some(color), Some(slug), None) =
            (record.get(0), record.get(1), record.get(2), record.get(3))
        else {
            skipped += 1;
            continue;
        };
        if name.is_empty() || slug.is_empty() {
            skipped += 1;
            continue;
        }
        let Ok(color) = HexColor::parse(color) else {
            tracing::warn!(name, color, "Skipping tag with invalid color");
            skipped += 1;
            continue;
        };
        rows.push(TagRow {
            name: name.to_string(),
            color,
            slug: slug.to_string(),
        });
    }

    (rows, skipped)
}

/// Parse the ingredient fixture.
///
/// # Errors
///
/// Returns `serde_json::Error` if the file is not an array of ingredients.
pub fn parse_ingredients(json: &str) -> Result<Vec<IngredientRow>, serde_json::Error> {
    serde_json::from_str(json)
}

async fn read(path: &Path) -> Result<String, CommandError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Read {
            path: path.display().to_string(),
            source,
        })
}

/// Load tags from a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or an insert fails.
pub async fn tags(path: &Path) -> Result<(), CommandError> {
    let content = read(path).await?;
    let (rows, skipped) = parse_tags(&content);
    tracing::info!(rows = rows.len(), skipped, "Parsed tag fixture");

    let (_, pool) = connect().await?;
    let repo = TagRepository::new(&pool);

    let mut inserted = 0;
    for row in &rows {
        if repo.insert_if_absent(&row.name, &row.color, &row.slug).await? {
            inserted += 1;
        }
    }

    tracing::info!("Tags loaded!");
    tracing::info!("  Inserted: {inserted}");
    tracing::info!("  Already present: {}", rows.len() - inserted);
    tracing::info!("  Skipped rows: {skipped}");
    Ok(())
}

/// Load ingredients from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or an insert fails.
pub async fn ingredients(path: &Path) -> Result<(), CommandError> {
    let content = read(path).await?;
    let rows = parse_ingredients(&content)?;
    tracing::info!(rows = rows.len(), "Parsed ingredient fixture");

    let (_, pool) = connect().await?;
    let repo = IngredientRepository::new(&pool);

    let mut inserted = 0;
    let mut skipped = 0;
    for row in &rows {
        let name = row.name.trim();
        let unit = row.measurement_unit.trim();
        if name.is_empty() || unit.is_empty() {
            skipped += 1;
            continue;
        }
        if repo.insert_if_absent(name, unit).await? {
            inserted += 1;
        }
    }

    tracing::info!("Ingredients loaded!");
    tracing::info!("  Inserted: {inserted}");
    tracing::info!("  Already present: {}", rows.len() - inserted - skipped);
    tracing::info!("  Skipped rows: {skipped}");
    Ok(())
}
