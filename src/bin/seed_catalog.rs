//! Utility to load a recipe catalog from a JSON file into the database
//!
//! Usage: `seed_catalog <catalog.json>`
//!
//! ```json
//! {
//!   "ingredients": [{"name": "Oats", "calories_kcal": 389, "protein_g": 16.9}],
//!   "recipes": [{
//!     "name": "Porridge",
//!     "min_prep_time": 10,
//!     "ingredients": [{"ingredient": "Oats", "relative_unit_100": 80}],
//!     "tags": ["breakfast", "vegetarian"]
//!   }]
//! }
//! ```

use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use epicourier::config;
use epicourier::db::{Database, DbError, DbResult};
use epicourier::models::{
    Ingredient, IngredientCreate, Recipe, RecipeCreate, RecipeIngredient, RecipeIngredientCreate, Tag,
};

#[derive(Debug, Default, Deserialize)]
struct Catalog {
    #[serde(default)]
    ingredients: Vec<IngredientCreate>,
    #[serde(default)]
    recipes: Vec<CatalogRecipe>,
}

#[derive(Debug, Deserialize)]
struct CatalogRecipe {
    #[serde(flatten)]
    recipe: RecipeCreate,
    #[serde(default)]
    ingredients: Vec<CatalogIngredient>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Ingredient reference by name, resolved against the database
#[derive(Debug, Deserialize)]
struct CatalogIngredient {
    ingredient: String,
    relative_unit_100: Option<f64>,
}

#[derive(Debug, Default, PartialEq)]
struct SeedCounts {
    ingredients: usize,
    recipes: usize,
    recipe_ingredients: usize,
    tags_attached: usize,
}

/// Insert everything in one pass; callers wrap this in a transaction
fn load_catalog(conn: &Connection, catalog: &Catalog) -> DbResult<SeedCounts> {
    let mut counts = SeedCounts::default();

    for ingredient in &catalog.ingredients {
        if ingredient.name.trim().is_empty() {
            return Err(DbError::Invalid("ingredient name cannot be empty".to_string()));
        }
        Ingredient::create(conn, ingredient)?;
        counts.ingredients += 1;
    }

    for entry in &catalog.recipes {
        if entry.recipe.name.trim().is_empty() {
            return Err(DbError::Invalid("recipe name cannot be empty".to_string()));
        }
        let recipe = Recipe::create(conn, &entry.recipe)?;
        counts.recipes += 1;

        for item in &entry.ingredients {
            let ingredient = Ingredient::get_by_name(conn, &item.ingredient)?.ok_or_else(|| {
                DbError::NotFound(format!(
                    "Ingredient '{}' (used by recipe '{}')",
                    item.ingredient, entry.recipe.name
                ))
            })?;
            RecipeIngredient::create(
                conn,
                &RecipeIngredientCreate {
                    recipe_id: recipe.id,
                    ingredient_id: ingredient.id,
                    relative_unit_100: item.relative_unit_100,
                },
            )?;
            counts.recipe_ingredients += 1;
        }

        for tag_name in entry.tags.iter().filter(|t| !t.trim().is_empty()) {
            let tag = Tag::get_or_create(conn, tag_name)?;
            Tag::attach(conn, recipe.id, tag.id)?;
            counts.tags_attached += 1;
        }
    }

    Ok(counts)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let catalog_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: seed_catalog <catalog.json>")?;

    let raw = std::fs::read_to_string(&catalog_path)?;
    let catalog: Catalog = serde_json::from_str(&raw)?;

    let db_path = config::database_path();
    println!("Database path: {}", db_path.display());
    let database = Database::open(&db_path)?;

    let counts = database.with_conn_mut(|conn| {
        let tx = conn.transaction()?;
        let counts = load_catalog(&tx, &catalog)?;
        tx.commit()?;
        Ok(counts)
    })?;

    println!("Catalog loaded from {}:", catalog_path.display());
    println!("  Ingredients: {}", counts.ingredients);
    println!("  Recipes: {}", counts.recipes);
    println!("  Recipe ingredients: {}", counts.recipe_ingredients);
    println!("  Tags attached: {}", counts.tags_attached);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::open(dir.path().join("seed.db")).unwrap();
        (dir, database)
    }

    #[test]
    fn test_load_catalog() {
        let catalog: Catalog = serde_json::from_str(
            r#"{
                "ingredients": [
                    {"name": "Oats", "calories_kcal": 389, "protein_g": 16.9},
                    {"name": "Milk", "unit": "ml", "calories_kcal": 42}
                ],
                "recipes": [{
                    "name": "Porridge",
                    "min_prep_time": 10,
                    "ingredients": [
                        {"ingredient": "oats", "relative_unit_100": 80},
                        {"ingredient": "Milk"}
                    ],
                    "tags": ["breakfast", "Breakfast", " "]
                }]
            }"#,
        )
        .unwrap();

        let (_dir, database) = open();
        let counts = database.with_conn(|conn| load_catalog(conn, &catalog)).unwrap();
        assert_eq!(
            counts,
            SeedCounts {
                ingredients: 2,
                recipes: 1,
                recipe_ingredients: 2,
                tags_attached: 2,
            }
        );

        let tags = database.with_conn(|conn| Tag::list_for_recipe(conn, 1)).unwrap();
        assert_eq!(tags.len(), 1);
        let milk = database.with_conn(|conn| Ingredient::get_by_name(conn, "milk")).unwrap().unwrap();
        assert_eq!(milk.unit, "ml");
    }

    #[test]
    fn test_unknown_ingredient_rolls_back() {
        let catalog: Catalog = serde_json::from_str(
            r#"{"recipes": [{"name": "Toast", "ingredients": [{"ingredient": "Bread"}]}]}"#,
        )
        .unwrap();

        let (_dir, database) = open();
        let result = database.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let counts = load_catalog(&tx, &catalog)?;
            tx.commit()?;
            Ok(counts)
        });
        assert!(matches!(result, Err(DbError::NotFound(_))));

        let total = database.with_conn(|conn| Recipe::count(conn, None)).unwrap();
        assert_eq!(total, 0);
    }
}
