//! Recipe model
//!
//! Catalog recipes. Nutrition is never cached on the row; it is derived from
//! the recipe's ingredient associations on demand.

use std::collections::{BTreeSet, HashMap};

use rusqlite::{params, params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// A catalog recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub min_prep_time: Option<i64>,
    pub green_score: Option<f64>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// The subset of a recipe embedded in calendar entries and insights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub min_prep_time: Option<i64>,
    pub green_score: Option<f64>,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub name: String,
    pub description: Option<String>,
    pub min_prep_time: Option<i64>,
    pub green_score: Option<f64>,
    pub image_url: Option<String>,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image_url: recipe.image_url,
            min_prep_time: recipe.min_prep_time,
            green_score: recipe.green_score,
        }
    }
}

/// Ids bound per IN query, well under SQLite's host parameter limit
const ID_CHUNK_SIZE: usize = 500;

/// `?1, ?2, ...` placeholders for an IN clause
fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Deduplicated ids, split into IN-clause sized batches
fn distinct_chunks(ids: &[i64]) -> Vec<Vec<i64>> {
    let distinct: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    distinct.chunks(ID_CHUNK_SIZE).map(<[i64]>::to_vec).collect()
}

impl Recipe {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            min_prep_time: row.get("min_prep_time")?,
            green_score: row.get("green_score")?,
            image_url: row.get("image_url")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new recipe
    pub fn create(conn: &Connection, data: &RecipeCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO recipes (name, description, min_prep_time, green_score, image_url)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.name,
                data.description,
                data.min_prep_time,
                data.green_score,
                data.image_url,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Recipe {}", id)))
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Batched name lookup; ids with no row are absent from the map.
    /// Repeated ids are looked up once.
    pub fn get_names(conn: &Connection, ids: &[i64]) -> DbResult<HashMap<i64, Option<String>>> {
        let mut names = HashMap::new();

        for chunk in distinct_chunks(ids) {
            let sql = format!(
                "SELECT id, name FROM recipes WHERE id IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            names.extend(rows);
        }

        Ok(names)
    }

    /// Fetch recipes by id, newest first
    pub fn list_by_ids(conn: &Connection, ids: &[i64]) -> DbResult<Vec<Self>> {
        let mut recipes = Vec::new();

        for chunk in distinct_chunks(ids) {
            let sql = format!(
                "SELECT * FROM recipes WHERE id IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            recipes.extend(rows);
        }

        recipes.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(recipes)
    }

    /// List recipes newest first, optionally matching name or description
    pub fn list(
        conn: &Connection,
        query: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let recipes = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT * FROM recipes
                    WHERE name LIKE ?1 OR description LIKE ?1
                    ORDER BY id DESC LIMIT ?2 OFFSET ?3
                    "#,
                )?;
                let pattern = format!("%{}%", q);
                let recipes = stmt
                    .query_map(params![pattern, limit, offset], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                recipes
            }
            None => {
                let mut stmt =
                    conn.prepare("SELECT * FROM recipes ORDER BY id DESC LIMIT ?1 OFFSET ?2")?;
                let recipes = stmt
                    .query_map(params![limit, offset], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                recipes
            }
        };

        Ok(recipes)
    }

    /// Count recipes matching the same search as `list`
    pub fn count(conn: &Connection, query: Option<&str>) -> DbResult<i64> {
        let count = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => conn.query_row(
                "SELECT COUNT(*) FROM recipes WHERE name LIKE ?1 OR description LIKE ?1",
                [format!("%{}%", q)],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Distinct ids of recipes using any of the given ingredients
    pub fn ids_with_ingredients(conn: &Connection, ingredient_ids: &[i64]) -> DbResult<Vec<i64>> {
        Self::distinct_ids(conn, "recipe_ingredients", "ingredient_id", ingredient_ids)
    }

    /// Distinct ids of recipes carrying any of the given tags
    pub fn ids_with_tags(conn: &Connection, tag_ids: &[i64]) -> DbResult<Vec<i64>> {
        Self::distinct_ids(conn, "recipe_tags", "tag_id", tag_ids)
    }

    fn distinct_ids(conn: &Connection, table: &str, column: &str, ids: &[i64]) -> DbResult<Vec<i64>> {
        let mut recipe_ids = BTreeSet::new();

        for chunk in distinct_chunks(ids) {
            let sql = format!(
                "SELECT DISTINCT recipe_id FROM {} WHERE {} IN ({})",
                table,
                column,
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            recipe_ids.extend(rows);
        }

        Ok(recipe_ids.into_iter().collect())
    }
}
