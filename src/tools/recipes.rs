//! Catalog MCP Tools
//!
//! Tools for ingredients, recipes, recipe ingredients and tags.

use serde::Serialize;

use crate::db::Database;
use crate::models::{
    Ingredient, IngredientAssociation, IngredientCreate, NutrientVector, Recipe, RecipeCreate, RecipeIngredient,
    RecipeIngredientCreate, RecipeIngredientDetail, Tag, TagCreate,
};
use crate::nutrition::recipe_nutrition;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Paging block shared by list responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Clamp a requested page/limit pair: pages start at 1, limits stay within bounds
    pub fn normalize(page: i64, limit: i64) -> (i64, i64) {
        (page.max(1), limit.clamp(1, MAX_PAGE_LIMIT))
    }

    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }

    /// Rows to skip; saturates so an absurd page number is just past the end
    pub fn offset(page: i64, limit: i64) -> i64 {
        page.saturating_sub(1).saturating_mul(limit)
    }
}

/// Filters accepted by list_recipes; ingredient filters win over tag filters
#[derive(Debug, Clone, Default)]
pub struct RecipeListQuery {
    pub query: Option<String>,
    pub ingredient_ids: Vec<i64>,
    pub tag_ids: Vec<i64>,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<Recipe>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct CreateRecipeResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct AddIngredientResponse {
    pub id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub relative_unit_100: Option<f64>,
}

/// Full recipe with ingredients, tags and summed nutrients
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredientDetail>,
    pub tags: Vec<Tag>,
    pub sum_nutrients: NutrientVector,
}

#[derive(Debug, Serialize)]
pub struct ListTagsResponse {
    pub data: Vec<Tag>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct TagRecipeResponse {
    pub success: bool,
    pub recipe_id: i64,
    pub tags: Vec<Tag>,
}

// ============================================================================
// Ingredient Tools
// ============================================================================

pub fn add_ingredient(db: &Database, data: IngredientCreate) -> Result<Ingredient, String> {
    if data.name.trim().is_empty() {
        return Err("Ingredient name cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Ingredient::create(&conn, &data).map_err(|e| format!("Failed to create ingredient: {}", e))
}

pub fn search_ingredients(db: &Database, query: &str, limit: i64) -> Result<Vec<Ingredient>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Ingredient::search(&conn, query, limit.clamp(1, MAX_PAGE_LIMIT))
        .map_err(|e| format!("Failed to search ingredients: {}", e))
}

// ============================================================================
// Recipe Tools
// ============================================================================

pub fn create_recipe(db: &Database, data: RecipeCreate) -> Result<CreateRecipeResponse, String> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err("Recipe name cannot be empty".to_string());
    }
    if let Some(minutes) = data.min_prep_time {
        if minutes < 0 {
            return Err("min_prep_time cannot be negative".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let data = RecipeCreate {
        name: name.to_string(),
        ..data
    };
    let recipe = Recipe::create(&conn, &data).map_err(|e| format!("Failed to create recipe: {}", e))?;

    Ok(CreateRecipeResponse {
        id: recipe.id,
        name: data.name,
        created_at: recipe.created_at,
    })
}

pub fn add_recipe_ingredient(
    db: &Database,
    data: RecipeIngredientCreate,
) -> Result<AddIngredientResponse, String> {
    if let Some(weight) = data.relative_unit_100 {
        if !weight.is_finite() || weight < 0.0 {
            return Err("relative_unit_100 must be a non-negative number".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let id = RecipeIngredient::create(&conn, &data)
        .map_err(|e| format!("Failed to add ingredient: {}", e))?;

    Ok(AddIngredientResponse {
        id,
        recipe_id: data.recipe_id,
        ingredient_id: data.ingredient_id,
        relative_unit_100: data.relative_unit_100,
    })
}

/// List recipes: by ingredient, by tag, or by free-text search over name and description
pub fn list_recipes(db: &Database, query: RecipeListQuery) -> Result<ListRecipesResponse, String> {
    let (page, limit) = Pagination::normalize(query.page, query.limit);
    let offset = Pagination::offset(page, limit);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let filtered_ids = if !query.ingredient_ids.is_empty() {
        Some(
            Recipe::ids_with_ingredients(&conn, &query.ingredient_ids)
                .map_err(|e| format!("Failed to filter by ingredient: {}", e))?,
        )
    } else if !query.tag_ids.is_empty() {
        Some(
            Recipe::ids_with_tags(&conn, &query.tag_ids)
                .map_err(|e| format!("Failed to filter by tag: {}", e))?,
        )
    } else {
        None
    };

    let (recipes, total) = match filtered_ids {
        Some(ids) => {
            let matches = Recipe::list_by_ids(&conn, &ids)
                .map_err(|e| format!("Failed to list recipes: {}", e))?;
            let total = matches.len() as i64;
            let page_items = matches
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect();
            (page_items, total)
        }
        None => {
            let recipes = Recipe::list(&conn, query.query.as_deref(), limit, offset)
                .map_err(|e| format!("Failed to list recipes: {}", e))?;
            let total = Recipe::count(&conn, query.query.as_deref())
                .map_err(|e| format!("Failed to count recipes: {}", e))?;
            (recipes, total)
        }
    };

    Ok(ListRecipesResponse {
        recipes,
        pagination: Pagination::new(page, limit, total),
    })
}

/// Recipe with ingredients, tags and summed nutrients
pub fn get_recipe(db: &Database, id: i64) -> Result<Option<RecipeDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let Some(recipe) = Recipe::get_by_id(&conn, id).map_err(|e| format!("Failed to get recipe: {}", e))?
    else {
        return Ok(None);
    };

    let ingredients = RecipeIngredient::get_details_for_recipe(&conn, id)
        .map_err(|e| format!("Failed to get ingredients: {}", e))?;
    let tags = Tag::list_for_recipe(&conn, id).map_err(|e| format!("Failed to get tags: {}", e))?;

    let associations: Vec<IngredientAssociation> = ingredients.iter().map(Into::into).collect();
    let sum_nutrients = recipe_nutrition(&associations);

    Ok(Some(RecipeDetail {
        recipe,
        ingredients,
        tags,
        sum_nutrients,
    }))
}

// ============================================================================
// Tag Tools
// ============================================================================

pub fn create_tag(db: &Database, data: TagCreate) -> Result<Tag, String> {
    if data.name.trim().is_empty() {
        return Err("Tag name cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Tag::create(&conn, &data).map_err(|e| format!("Failed to create tag: {}", e))
}

pub fn search_tags(db: &Database, query: Option<&str>, page: i64, limit: i64) -> Result<ListTagsResponse, String> {
    let (page, limit) = Pagination::normalize(page, limit);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = Tag::search(&conn, query, limit, Pagination::offset(page, limit))
        .map_err(|e| format!("Failed to search tags: {}", e))?;
    let total = Tag::count(&conn, query).map_err(|e| format!("Failed to count tags: {}", e))?;

    Ok(ListTagsResponse {
        data,
        pagination: Pagination::new(page, limit, total),
    })
}

pub fn tag_recipe(db: &Database, recipe_id: i64, tag_name: &str) -> Result<TagRecipeResponse, String> {
    if tag_name.trim().is_empty() {
        return Err("Tag name cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    // Checked first so an unknown recipe leaves no orphan tag behind
    if Recipe::get_by_id(&conn, recipe_id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?
        .is_none()
    {
        return Err(format!("Recipe {} not found", recipe_id));
    }
    let tag = Tag::get_or_create(&conn, tag_name).map_err(|e| format!("Failed to get tag: {}", e))?;
    Tag::attach(&conn, recipe_id, tag.id).map_err(|e| format!("Failed to tag recipe: {}", e))?;
    let tags = Tag::list_for_recipe(&conn, recipe_id).map_err(|e| format!("Failed to get tags: {}", e))?;

    Ok(TagRecipeResponse {
        success: true,
        recipe_id,
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::IngredientNutrients;

    fn ingredient(db: &Database, name: &str, calories: Option<f64>, protein: Option<f64>) -> Ingredient {
        add_ingredient(
            db,
            IngredientCreate {
                name: name.to_string(),
                unit: "g".to_string(),
                nutrients: IngredientNutrients {
                    calories_kcal: calories,
                    protein_g: protein,
                    ..Default::default()
                },
            },
        )
        .unwrap()
    }

    fn recipe(db: &Database, name: &str) -> i64 {
        create_recipe(
            db,
            RecipeCreate {
                name: name.to_string(),
                ..Default::default()
            },
        )
        .unwrap()
        .id
    }

    fn link(db: &Database, recipe_id: i64, ingredient_id: i64, weight: Option<f64>) {
        add_recipe_ingredient(
            db,
            RecipeIngredientCreate {
                recipe_id,
                ingredient_id,
                relative_unit_100: weight,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_get_recipe_sums_weighted_nutrients() {
        let (_dir, db) = test_database();
        let beef = ingredient(&db, "Beef", Some(100.0), Some(10.0));
        let beans = ingredient(&db, "Beans", Some(20.0), Some(1.0));
        let salt = ingredient(&db, "Salt", None, None);
        let chili = recipe(&db, "Chili");
        link(&db, chili, beef.id, Some(50.0));
        link(&db, chili, beans.id, Some(200.0));
        link(&db, chili, salt.id, None);

        tag_recipe(&db, chili, "Spicy").unwrap();

        let detail = get_recipe(&db, chili).unwrap().unwrap();
        assert_eq!(detail.ingredients.len(), 3);
        assert_eq!(detail.tags.len(), 1);
        assert!((detail.sum_nutrients.calories_kcal - 90.0).abs() < 1e-9);
        assert!((detail.sum_nutrients.protein_g - 7.0).abs() < 1e-9);

        assert!(get_recipe(&db, chili + 100).unwrap().is_none());
    }

    #[test]
    fn test_list_recipes_filters() {
        let (_dir, db) = test_database();
        let rice = ingredient(&db, "Rice", Some(130.0), Some(2.7));
        let bowl = recipe(&db, "Rice Bowl");
        let risotto = recipe(&db, "Risotto");
        let toast = recipe(&db, "Toast");
        link(&db, bowl, rice.id, Some(150.0));
        link(&db, risotto, rice.id, Some(120.0));
        link(&db, risotto, rice.id, Some(10.0));
        tag_recipe(&db, toast, "Breakfast").unwrap();

        let by_ingredient = list_recipes(
            &db,
            RecipeListQuery {
                ingredient_ids: vec![rice.id],
                page: 1,
                limit: 20,
                ..Default::default()
            },
        )
        .unwrap();
        let ids: Vec<i64> = by_ingredient.recipes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![risotto, bowl]);
        assert_eq!(by_ingredient.pagination.total, 2);

        let tags = search_tags(&db, Some("break"), 1, 20).unwrap();
        let by_tag = list_recipes(
            &db,
            RecipeListQuery {
                tag_ids: vec![tags.data[0].id],
                page: 1,
                limit: 20,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(by_tag.recipes.len(), 1);
        assert_eq!(by_tag.recipes[0].id, toast);

        let searched = list_recipes(
            &db,
            RecipeListQuery {
                query: Some("ris".to_string()),
                page: 0,
                limit: 500,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(searched.recipes.len(), 1);
        assert_eq!(searched.pagination, Pagination::new(1, MAX_PAGE_LIMIT, 1));
    }

    #[test]
    fn test_pagination_math() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages, 2);
        assert_eq!(Pagination::normalize(-3, 0), (1, 1));
        assert_eq!(Pagination::offset(3, 20), 40);
        assert_eq!(Pagination::offset(i64::MAX, MAX_PAGE_LIMIT), i64::MAX);
    }

    #[test]
    fn test_page_far_past_the_end_is_empty() {
        let (_dir, db) = test_database();
        let rice = ingredient(&db, "Rice", Some(130.0), Some(2.7));
        let bowl = recipe(&db, "Rice Bowl");
        link(&db, bowl, rice.id, Some(150.0));
        tag_recipe(&db, bowl, "Lunch").unwrap();

        for query in [
            RecipeListQuery::default(),
            RecipeListQuery {
                ingredient_ids: vec![rice.id],
                ..Default::default()
            },
        ] {
            let response = list_recipes(
                &db,
                RecipeListQuery {
                    page: i64::MAX,
                    limit: 20,
                    ..query
                },
            )
            .unwrap();
            assert!(response.recipes.is_empty());
            assert_eq!(response.pagination.page, i64::MAX);
            assert_eq!(response.pagination.total, 1);
        }

        let tags = search_tags(&db, None, i64::MAX, 20).unwrap();
        assert!(tags.data.is_empty());
        assert_eq!(tags.pagination.total, 1);
    }

    #[test]
    fn test_tagging_unknown_recipe_creates_no_tag() {
        let (_dir, db) = test_database();

        let err = tag_recipe(&db, 404, "Orphan").unwrap_err();
        assert_eq!(err, "Recipe 404 not found");
        assert_eq!(search_tags(&db, None, 1, 20).unwrap().pagination.total, 0);

        let soup = recipe(&db, "Soup");
        let tagged = tag_recipe(&db, soup, "Orphan").unwrap();
        assert_eq!(tagged.tags.len(), 1);
    }

    #[test]
    fn test_validation_errors() {
        let (_dir, db) = test_database();
        assert!(create_recipe(&db, RecipeCreate::default()).is_err());
        assert!(add_recipe_ingredient(
            &db,
            RecipeIngredientCreate {
                recipe_id: 1,
                ingredient_id: 1,
                relative_unit_100: Some(-5.0),
            },
        )
        .is_err());
        assert!(tag_recipe(&db, 1, " ").is_err());
    }
}
