//! Favorites and Review MCP Tools
//!
//! Per-user starred recipes, plus star ratings with a per-recipe summary.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Favorite, Recipe, Review, ReviewStats, ReviewUpsert, MAX_RATING, MIN_RATING};

#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub user_id: i64,
    pub recipe_id: i64,
    /// State after the toggle
    pub favorited: bool,
}

#[derive(Debug, Serialize)]
pub struct ListFavoritesResponse {
    pub user_id: i64,
    pub count: usize,
    pub favorites: Vec<Favorite>,
}

#[derive(Debug, Serialize)]
pub struct RecipeReviewsResponse {
    pub recipe_id: i64,
    pub stats: ReviewStats,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct DeleteReviewResponse {
    pub success: bool,
    pub user_id: i64,
    pub recipe_id: i64,
}

// ============================================================================
// Favorite Tools
// ============================================================================

pub fn toggle_favorite(db: &Database, user_id: i64, recipe_id: i64) -> Result<ToggleFavoriteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let favorited = Favorite::toggle(&conn, user_id, recipe_id)
        .map_err(|e| format!("Failed to toggle favorite: {}", e))?;

    Ok(ToggleFavoriteResponse {
        user_id,
        recipe_id,
        favorited,
    })
}

pub fn list_favorites(db: &Database, user_id: i64) -> Result<ListFavoritesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let favorites = Favorite::list_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to list favorites: {}", e))?;

    Ok(ListFavoritesResponse {
        user_id,
        count: favorites.len(),
        favorites,
    })
}

// ============================================================================
// Review Tools
// ============================================================================

/// Create or edit the user's review of a recipe
pub fn review_recipe(
    db: &Database,
    user_id: i64,
    recipe_id: i64,
    rating: i64,
    comment: Option<String>,
) -> Result<Review, String> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(format!("Rating must be between {} and {}", MIN_RATING, MAX_RATING));
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let data = ReviewUpsert {
        user_id,
        recipe_id,
        rating,
        comment,
    };
    Review::upsert(&conn, &data).map_err(|e| format!("Failed to save review: {}", e))
}

/// All reviews of a recipe with the rating summary
pub fn get_recipe_reviews(db: &Database, recipe_id: i64) -> Result<RecipeReviewsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Recipe::get_by_id(&conn, recipe_id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?
        .is_none()
    {
        return Err(format!("Recipe {} not found", recipe_id));
    }

    let reviews = Review::list_for_recipe(&conn, recipe_id)
        .map_err(|e| format!("Failed to list reviews: {}", e))?;

    Ok(RecipeReviewsResponse {
        recipe_id,
        stats: ReviewStats::from_reviews(&reviews),
        reviews,
    })
}

pub fn delete_review(db: &Database, user_id: i64, recipe_id: i64) -> Result<DeleteReviewResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let success = Review::delete(&conn, user_id, recipe_id)
        .map_err(|e| format!("Failed to delete review: {}", e))?;

    Ok(DeleteReviewResponse {
        success,
        user_id,
        recipe_id,
    })
}
