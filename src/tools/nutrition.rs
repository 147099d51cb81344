//! Nutrition MCP Tools
//!
//! Aggregated nutrition for an explicit recipe list or for the meals on a
//! user's calendar, and side-by-side recipe comparison.

use std::collections::HashSet;

use serde::Serialize;

use crate::db::Database;
use crate::models::{parse_date, CalendarEntry, NutrientVector, Recipe, Review, ReviewStats};
use crate::nutrition::{compute_aggregated_nutrition, AggregatedNutrition, NutritionSource};

/// Recipes shown side by side at most
pub const MAX_COMPARE_RECIPES: usize = 3;

#[derive(Debug, Serialize)]
pub struct AggregateNutritionResponse {
    pub requested: usize,
    /// `None` when no recipe ids were given
    pub nutrition: Option<AggregatedNutrition>,
}

/// Aggregate nutrition across the given recipe ids (duplicates count twice)
pub async fn aggregate_nutrition(
    source: &dyn NutritionSource,
    recipe_ids: &[i64],
) -> Result<AggregateNutritionResponse, String> {
    let nutrition = compute_aggregated_nutrition(recipe_ids, source)
        .await
        .map_err(|e| format!("Could not load nutrition data: {}", e))?;

    Ok(AggregateNutritionResponse {
        requested: recipe_ids.len(),
        nutrition,
    })
}

/// Aggregate nutrition over every meal a user planned in the date range.
/// A recipe planned for several meals is counted once per meal.
pub async fn calendar_nutrition(
    db: &Database,
    source: &dyn NutritionSource,
    user_id: i64,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<AggregateNutritionResponse, String> {
    let start = start.map(parse_date).transpose().map_err(|e| e.to_string())?;
    let end = end.map(parse_date).transpose().map_err(|e| e.to_string())?;

    let recipe_ids: Vec<i64> = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        CalendarEntry::list_for_user(&conn, user_id, start, end)
            .map_err(|e| format!("Failed to list calendar: {}", e))?
            .iter()
            .map(|entry| entry.recipe_id)
            .collect()
    };

    aggregate_nutrition(source, &recipe_ids).await
}

/// One column of a comparison
#[derive(Debug, Serialize)]
pub struct RecipeComparison {
    pub recipe: Recipe,
    /// `None` when the recipe's ingredients could not be loaded
    pub nutrition: Option<NutrientVector>,
    pub reviews: ReviewStats,
}

#[derive(Debug, Serialize)]
pub struct CompareRecipesResponse {
    pub recipes: Vec<RecipeComparison>,
}

/// Compare up to three distinct recipes: details, summed nutrients and
/// rating summary, in the order requested
pub async fn compare_recipes(
    db: &Database,
    source: &dyn NutritionSource,
    recipe_ids: &[i64],
) -> Result<CompareRecipesResponse, String> {
    if recipe_ids.is_empty() {
        return Err("Select at least one recipe to compare".to_string());
    }
    if recipe_ids.len() > MAX_COMPARE_RECIPES {
        return Err(format!("At most {} recipes can be compared", MAX_COMPARE_RECIPES));
    }
    let mut seen = HashSet::new();
    if let Some(repeated) = recipe_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(format!("Recipe {} is listed more than once", repeated));
    }

    let columns = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        let mut columns = Vec::with_capacity(recipe_ids.len());
        for &recipe_id in recipe_ids {
            let recipe = Recipe::get_by_id(&conn, recipe_id)
                .map_err(|e| format!("Failed to get recipe: {}", e))?
                .ok_or_else(|| format!("Recipe {} not found", recipe_id))?;
            let reviews = Review::list_for_recipe(&conn, recipe_id)
                .map_err(|e| format!("Failed to list reviews: {}", e))?;
            columns.push((recipe, ReviewStats::from_reviews(&reviews)));
        }
        columns
    };

    let aggregated = compute_aggregated_nutrition(recipe_ids, source)
        .await
        .map_err(|e| format!("Could not load nutrition data: {}", e))?;
    let fetched = aggregated.map(|a| a.recipes).unwrap_or_default();

    let recipes = columns
        .into_iter()
        .map(|(recipe, reviews)| RecipeComparison {
            nutrition: fetched
                .iter()
                .find(|n| n.recipe_id == recipe.id)
                .map(|n| n.nutrition),
            recipe,
            reviews,
        })
        .collect();

    Ok(CompareRecipesResponse { recipes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{
        CalendarEntryCreate, Ingredient, IngredientCreate, IngredientNutrients, MealType,
        RecipeCreate, RecipeIngredient, RecipeIngredientCreate, ReviewUpsert, User, UserCreate,
    };
    use crate::nutrition::{NutritionError, SqliteNutritionSource};

    /// One recipe with 200 units of a 50 kcal/10 g protein ingredient
    fn seed(db: &Database) -> (i64, i64) {
        let conn = db.get_conn().unwrap();
        let ingredient = Ingredient::create(
            &conn,
            &IngredientCreate {
                name: "Lentils".to_string(),
                nutrients: IngredientNutrients {
                    calories_kcal: Some(50.0),
                    protein_g: Some(10.0),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .unwrap();
        let recipe = Recipe::create(
            &conn,
            &RecipeCreate {
                name: "Dal".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        RecipeIngredient::create(
            &conn,
            &RecipeIngredientCreate {
                recipe_id: recipe.id,
                ingredient_id: ingredient.id,
                relative_unit_100: Some(200.0),
            },
        )
        .unwrap();
        let user = User::create(
            &conn,
            &UserCreate {
                fullname: "Ana".to_string(),
                email: "ana@example.com".to_string(),
            },
        )
        .unwrap();
        (user.id, recipe.id)
    }

    #[tokio::test]
    async fn test_aggregate_from_database() {
        let (_dir, db) = test_database();
        let (_, recipe_id) = seed(&db);
        let source = SqliteNutritionSource::new(db.clone());

        let response = aggregate_nutrition(&source, &[recipe_id, 9999]).await.unwrap();
        assert_eq!(response.requested, 2);
        let nutrition = response.nutrition.unwrap();
        assert_eq!(nutrition.recipes.len(), 1);
        assert_eq!(nutrition.recipes[0].recipe_name, "Dal");
        assert_eq!(nutrition.total.calories_kcal, 100.0);
        assert_eq!(nutrition.average.protein_g, 20.0);
    }

    #[tokio::test]
    async fn test_aggregate_many_repeated_ids() {
        let (_dir, db) = test_database();
        let (_, recipe_id) = seed(&db);
        let source = SqliteNutritionSource::new(db.clone());

        let ids = vec![recipe_id; 40_000];
        let response = aggregate_nutrition(&source, &ids).await.unwrap();
        let nutrition = response.nutrition.unwrap();
        assert_eq!(nutrition.recipes.len(), 40_000);
        assert_eq!(nutrition.total.calories_kcal, 100.0 * 40_000.0);
        assert_eq!(nutrition.average.calories_kcal, 100.0);
    }

    #[tokio::test]
    async fn test_missing_recipe_table_is_a_fetch_error() {
        let (_dir, db) = test_database();
        let (_, recipe_id) = seed(&db);
        db.with_conn(|conn| {
            conn.execute_batch("ALTER TABLE recipes RENAME TO recipes_archived")?;
            Ok(())
        })
        .unwrap();
        let source = SqliteNutritionSource::new(db.clone());

        let err = compute_aggregated_nutrition(&[recipe_id], &source).await.unwrap_err();
        assert!(matches!(err, NutritionError::DataFetch(_)));

        let err = aggregate_nutrition(&source, &[recipe_id]).await.unwrap_err();
        assert!(err.starts_with("Could not load nutrition data"));
        assert!(err.contains("no such table"));
    }

    #[tokio::test]
    async fn test_missing_ingredient_rows_table_drops_recipe() {
        let (_dir, db) = test_database();
        let (_, recipe_id) = seed(&db);
        db.with_conn(|conn| {
            conn.execute_batch("ALTER TABLE recipe_ingredients RENAME TO recipe_ingredients_old")?;
            Ok(())
        })
        .unwrap();
        let source = SqliteNutritionSource::new(db.clone());

        let nutrition = aggregate_nutrition(&source, &[recipe_id]).await.unwrap().nutrition.unwrap();
        assert!(nutrition.recipes.is_empty());
        assert_eq!(nutrition.total.calories_kcal, 0.0);
    }

    #[tokio::test]
    async fn test_compare_recipes() {
        let (_dir, db) = test_database();
        let (user_id, dal) = seed(&db);
        let toast = {
            let conn = db.get_conn().unwrap();
            let toast = Recipe::create(
                &conn,
                &RecipeCreate {
                    name: "Toast".to_string(),
                    min_prep_time: Some(5),
                    ..Default::default()
                },
            )
            .unwrap();
            Review::upsert(
                &conn,
                &ReviewUpsert {
                    user_id,
                    recipe_id: toast.id,
                    rating: 4,
                    comment: None,
                },
            )
            .unwrap();
            toast.id
        };
        let source = SqliteNutritionSource::new(db.clone());

        let response = compare_recipes(&db, &source, &[toast, dal]).await.unwrap();
        let names: Vec<Option<&str>> = response.recipes.iter().map(|c| c.recipe.name.as_deref()).collect();
        assert_eq!(names, vec![Some("Toast"), Some("Dal")]);
        assert_eq!(response.recipes[0].nutrition.unwrap().calories_kcal, 0.0);
        assert_eq!(response.recipes[0].reviews.average_rating, 4.0);
        assert_eq!(response.recipes[1].nutrition.unwrap().calories_kcal, 100.0);
        assert_eq!(response.recipes[1].reviews.total_reviews, 0);
    }

    #[tokio::test]
    async fn test_compare_recipes_rejects_bad_selections() {
        let (_dir, db) = test_database();
        let (_, dal) = seed(&db);
        let source = SqliteNutritionSource::new(db.clone());

        assert!(compare_recipes(&db, &source, &[]).await.is_err());
        let err = compare_recipes(&db, &source, &[dal, 2, 3, 4]).await.unwrap_err();
        assert_eq!(err, "At most 3 recipes can be compared");
        let err = compare_recipes(&db, &source, &[dal, dal]).await.unwrap_err();
        assert!(err.contains("more than once"));
        let err = compare_recipes(&db, &source, &[dal, 404]).await.unwrap_err();
        assert_eq!(err, "Recipe 404 not found");
    }

    #[tokio::test]
    async fn test_empty_request() {
        let (_dir, db) = test_database();
        let source = SqliteNutritionSource::new(db);
        let response = aggregate_nutrition(&source, &[]).await.unwrap();
        assert!(response.nutrition.is_none());
    }

    #[tokio::test]
    async fn test_calendar_nutrition_counts_each_meal() {
        let (_dir, db) = test_database();
        let (user_id, recipe_id) = seed(&db);
        {
            let conn = db.get_conn().unwrap();
            for (date, meal_type) in [("2025-02-01", MealType::Lunch), ("2025-02-02", MealType::Dinner)] {
                CalendarEntry::create(
                    &conn,
                    &CalendarEntryCreate {
                        user_id,
                        recipe_id,
                        date: date.to_string(),
                        meal_type,
                        notes: None,
                    },
                )
                .unwrap();
            }
        }
        let source = SqliteNutritionSource::new(db.clone());

        let all = calendar_nutrition(&db, &source, user_id, None, None).await.unwrap();
        let all = all.nutrition.unwrap();
        assert_eq!(all.recipes.len(), 2);
        assert_eq!(all.total.calories_kcal, 200.0);
        assert_eq!(all.average.calories_kcal, 100.0);

        let one_day = calendar_nutrition(&db, &source, user_id, Some("2025-02-02"), None)
            .await
            .unwrap();
        assert_eq!(one_day.requested, 1);

        let none = calendar_nutrition(&db, &source, user_id, Some("2026-01-01"), None)
            .await
            .unwrap();
        assert!(none.nutrition.is_none());
    }
}
