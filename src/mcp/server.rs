//! EpiCourier MCP Server Implementation
//!
//! Implements the MCP server with all meal planner tools.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{
    parse_date, IngredientCreate, IngredientNutrients, RecipeCreate, RecipeIngredientCreate, TagCreate,
    UserCreate,
};
use crate::nutrition::SqliteNutritionSource;
use crate::recommender::RecommenderClient;
use crate::tools::recipes::{RecipeListQuery, DEFAULT_PAGE_LIMIT};
use crate::tools::status::StatusTracker;
use crate::tools::{calendar, insights, nutrition, recipes, recommender, reviews};

/// EpiCourier MCP Service
#[derive(Clone)]
pub struct EpiCourierService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    nutrition_source: SqliteNutritionSource,
    recommender: RecommenderClient,
    tool_router: ToolRouter<EpiCourierService>,
}

impl EpiCourierService {
    pub fn new(database_path: PathBuf, database: Database, recommender: RecommenderClient) -> Self {
        let backend_url = recommender.base_url().to_string();
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, backend_url))),
            nutrition_source: SqliteNutritionSource::new(database.clone()),
            database,
            recommender,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// `today` override for insight tools, defaulting to the local date
fn resolve_today(today: Option<&str>) -> Result<NaiveDate, McpError> {
    match today {
        Some(s) => parse_date(s).map_err(|e| McpError::invalid_params(e.to_string(), None)),
        None => Ok(Local::now().date_naive()),
    }
}

// ============================================================================
// Ingredient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddIngredientParams {
    pub name: String,
    /// Reference unit for the nutrient values (default "g")
    pub unit: Option<String>,
    pub calories_kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub sugars_g: Option<f64>,
    pub agg_fats_g: Option<f64>,
    pub cholesterol_mg: Option<f64>,
    pub agg_minerals_mg: Option<f64>,
    pub vit_a_microg: Option<f64>,
    pub agg_vit_b_mg: Option<f64>,
    pub vit_c_mg: Option<f64>,
    pub vit_d_microg: Option<f64>,
    pub vit_e_mg: Option<f64>,
    pub vit_k_microg: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchIngredientsParams {
    pub query: String,
    #[serde(default = "default_page_limit")]
    pub limit: i64,
}

fn default_page_limit() -> i64 { DEFAULT_PAGE_LIMIT }
fn default_page() -> i64 { 1 }

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    pub name: String,
    pub description: Option<String>,
    /// Minimum preparation time in minutes
    pub min_prep_time: Option<i64>,
    pub green_score: Option<f64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddRecipeIngredientParams {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    /// Relative weight; 100 is one base portion. Omitted means 100.
    pub relative_unit_100: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    /// Matches recipe name or description
    pub query: Option<String>,
    #[serde(default)]
    pub ingredient_ids: Vec<i64>,
    /// Ignored when ingredient_ids is non-empty
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecipeParams {
    pub id: i64,
}

// ============================================================================
// Tag Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateTagParams {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchTagsParams {
    pub query: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TagRecipeParams {
    pub recipe_id: i64,
    /// Tag name; created if it does not exist
    pub tag: String,
}

// ============================================================================
// User and Calendar Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateUserParams {
    pub fullname: String,
    pub email: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddCalendarEntryParams {
    pub user_id: i64,
    pub recipe_id: i64,
    /// YYYY-MM-DD
    pub date: String,
    /// breakfast, lunch, dinner or snack
    pub meal_type: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListCalendarParams {
    pub user_id: i64,
    /// Inclusive start date (YYYY-MM-DD)
    pub start: Option<String>,
    /// Inclusive end date (YYYY-MM-DD)
    pub end: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateCalendarStatusParams {
    pub id: i64,
    pub user_id: i64,
    /// true once the meal has been eaten
    pub status: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteCalendarEntryParams {
    pub id: i64,
    pub user_id: i64,
}

// ============================================================================
// Favorite and Review Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserRecipeParams {
    pub user_id: i64,
    pub recipe_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReviewRecipeParams {
    pub user_id: i64,
    pub recipe_id: i64,
    /// Stars from 1 to 5
    pub rating: i64,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeIdParams {
    pub recipe_id: i64,
}

// ============================================================================
// Nutrition, Insight and Recommender Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CompareRecipesParams {
    /// One to three distinct recipe ids
    pub recipe_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AggregateNutritionParams {
    /// Recipe ids; repeated ids are counted once per occurrence
    pub recipe_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct InsightsParams {
    pub user_id: i64,
    /// Reference date (YYYY-MM-DD), defaults to today
    pub today: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserIdParams {
    pub user_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecommendMealsParams {
    pub goal: String,
    /// Between 1 and 10
    pub num_meals: u32,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl EpiCourierService {
    // --- Status ---

    #[tool(description = "Get the current status of the EpiCourier service including build info, database status, recommender backend and process information")]
    async fn epicourier_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        to_json(&status)
    }

    #[tool(description = "Get step-by-step instructions for building the recipe catalog, planning meals and reviewing nutrition. Call this when unsure how to use the planner tools.")]
    fn planner_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::PLANNER_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(PLANNER_INSTRUCTIONS)]))
    }

    // --- Ingredients ---

    #[tool(description = "Create an ingredient with nutrient values per 100 reference units. Omitted nutrients count as 0.")]
    fn add_ingredient(&self, Parameters(p): Parameters<AddIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = IngredientCreate {
            name: p.name,
            unit: p.unit.unwrap_or_else(|| "g".to_string()),
            nutrients: IngredientNutrients {
                calories_kcal: p.calories_kcal, protein_g: p.protein_g, carbs_g: p.carbs_g,
                sugars_g: p.sugars_g, agg_fats_g: p.agg_fats_g, cholesterol_mg: p.cholesterol_mg,
                agg_minerals_mg: p.agg_minerals_mg, vit_a_microg: p.vit_a_microg, agg_vit_b_mg: p.agg_vit_b_mg,
                vit_c_mg: p.vit_c_mg, vit_d_microg: p.vit_d_microg, vit_e_mg: p.vit_e_mg,
                vit_k_microg: p.vit_k_microg,
            },
        };
        let result = recipes::add_ingredient(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Search ingredients by name")]
    fn search_ingredients(&self, Parameters(p): Parameters<SearchIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::search_ingredients(&self.database, &p.query, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Recipes ---

    #[tool(description = "Create a new recipe (ingredients and tags added separately)")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeCreate {
            name: p.name, description: p.description, min_prep_time: p.min_prep_time,
            green_score: p.green_score, image_url: p.image_url,
        };
        let result = recipes::create_recipe(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add an ingredient to a recipe with a relative weight (100 = one base portion)")]
    fn add_recipe_ingredient(&self, Parameters(p): Parameters<AddRecipeIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeIngredientCreate {
            recipe_id: p.recipe_id, ingredient_id: p.ingredient_id, relative_unit_100: p.relative_unit_100,
        };
        let result = recipes::add_recipe_ingredient(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List recipes with pagination. Filter by ingredient ids, by tag ids, or search name and description.")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let query = RecipeListQuery {
            query: p.query, ingredient_ids: p.ingredient_ids, tag_ids: p.tag_ids, page: p.page, limit: p.limit,
        };
        let result = recipes::list_recipes(&self.database, query).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get full recipe details with ingredients, tags and summed nutrients")]
    fn get_recipe(&self, Parameters(p): Parameters<GetRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(detail) => to_json(&detail),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Recipe not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    // --- Tags ---

    #[tool(description = "Create a new tag")]
    fn create_tag(&self, Parameters(p): Parameters<CreateTagParams>) -> Result<CallToolResult, McpError> {
        let data = TagCreate { name: p.name, description: p.description };
        let result = recipes::create_tag(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Search tags by name with pagination")]
    fn search_tags(&self, Parameters(p): Parameters<SearchTagsParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::search_tags(&self.database, p.query.as_deref(), p.page, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Attach a tag to a recipe by name, creating the tag if needed")]
    fn tag_recipe(&self, Parameters(p): Parameters<TagRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::tag_recipe(&self.database, p.recipe_id, &p.tag).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Favorites and Reviews ---

    #[tool(description = "Star a recipe for a user, or unstar it if already starred. Returns the new state.")]
    fn toggle_favorite(&self, Parameters(p): Parameters<UserRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = reviews::toggle_favorite(&self.database, p.user_id, p.recipe_id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List a user's favorite recipes, most recently starred first")]
    fn list_favorites(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = reviews::list_favorites(&self.database, p.user_id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Rate a recipe from 1 to 5 with an optional comment. Reviewing again edits the user's earlier review.")]
    fn review_recipe(&self, Parameters(p): Parameters<ReviewRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = reviews::review_recipe(&self.database, p.user_id, p.recipe_id, p.rating, p.comment)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "All reviews of a recipe, newest first, with average rating and per-star counts")]
    fn get_recipe_reviews(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let result = reviews::get_recipe_reviews(&self.database, p.recipe_id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a user's review of a recipe")]
    fn delete_review(&self, Parameters(p): Parameters<UserRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = reviews::delete_review(&self.database, p.user_id, p.recipe_id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Users ---

    #[tool(description = "Create a user profile")]
    fn create_user(&self, Parameters(p): Parameters<CreateUserParams>) -> Result<CallToolResult, McpError> {
        let data = UserCreate { fullname: p.fullname, email: p.email };
        let result = calendar::create_user(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List all users")]
    fn list_users(&self) -> Result<CallToolResult, McpError> {
        let result = calendar::list_users(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Calendar ---

    #[tool(description = "Plan a recipe on a user's calendar for a date and meal type")]
    fn add_calendar_entry(&self, Parameters(p): Parameters<AddCalendarEntryParams>) -> Result<CallToolResult, McpError> {
        let result = calendar::add_calendar_entry(&self.database, p.user_id, p.recipe_id, &p.date, &p.meal_type, p.notes)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List a user's calendar entries with recipe summaries, optionally within a date range")]
    fn list_calendar(&self, Parameters(p): Parameters<ListCalendarParams>) -> Result<CallToolResult, McpError> {
        let result = calendar::list_calendar(&self.database, p.user_id, p.start.as_deref(), p.end.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Mark a calendar entry as eaten (true) or not eaten (false). Only the owner can update it.")]
    fn update_calendar_status(&self, Parameters(p): Parameters<UpdateCalendarStatusParams>) -> Result<CallToolResult, McpError> {
        let result = calendar::update_calendar_status(&self.database, p.id, p.user_id, p.status)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(updated) => to_json(&updated),
            Err(not_found) => to_json(&not_found),
        }
    }

    #[tool(description = "Delete a calendar entry. Only the owner can delete it.")]
    fn delete_calendar_entry(&self, Parameters(p): Parameters<DeleteCalendarEntryParams>) -> Result<CallToolResult, McpError> {
        let result = calendar::delete_calendar_entry(&self.database, p.id, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(deleted) => to_json(&deleted),
            Err(not_found) => to_json(&not_found),
        }
    }

    // --- Nutrition ---

    #[tool(description = "Total and average nutrition across recipes. Repeated ids count once per occurrence; recipes that fail to load are skipped.")]
    async fn aggregate_nutrition(&self, Parameters(p): Parameters<AggregateNutritionParams>) -> Result<CallToolResult, McpError> {
        let result = nutrition::aggregate_nutrition(&self.nutrition_source, &p.recipe_ids)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Total and average nutrition across every meal on a user's calendar, optionally within a date range")]
    async fn calendar_nutrition(&self, Parameters(p): Parameters<ListCalendarParams>) -> Result<CallToolResult, McpError> {
        let result = nutrition::calendar_nutrition(
            &self.database,
            &self.nutrition_source,
            p.user_id,
            p.start.as_deref(),
            p.end.as_deref(),
        )
        .await
        .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Compare up to 3 distinct recipes side by side: details, summed nutrients and rating summary")]
    async fn compare_recipes(&self, Parameters(p): Parameters<CompareRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = nutrition::compare_recipes(&self.database, &self.nutrition_source, &p.recipe_ids)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Insights ---

    #[tool(description = "Planned and eaten meals per day from one year ago onward, including meals planned for upcoming days")]
    fn insights_activity(&self, Parameters(p): Parameters<InsightsParams>) -> Result<CallToolResult, McpError> {
        let today = resolve_today(p.today.as_deref())?;
        let result = insights::activity(&self.database, p.user_id, today).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "How often each recipe was planned by a user, most frequent first")]
    fn insights_recipe_counts(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = insights::recipe_counts(&self.database, p.user_id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Weekly planning counts for a user's top 5 recipes from six months ago onward, including upcoming weeks")]
    fn insights_recipe_trends(&self, Parameters(p): Parameters<InsightsParams>) -> Result<CallToolResult, McpError> {
        let today = resolve_today(p.today.as_deref())?;
        let result = insights::recipe_trends(&self.database, p.user_id, today).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Recommender ---

    #[tool(description = "Ask the recommender backend for a meal plan matching a free-text goal")]
    async fn recommend_meals(&self, Parameters(p): Parameters<RecommendMealsParams>) -> Result<CallToolResult, McpError> {
        let result = recommender::recommend_meals(&self.recommender, &p.goal, p.num_meals)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Check whether the recommender backend is reachable")]
    async fn recommender_health(&self) -> Result<CallToolResult, McpError> {
        let result = recommender::recommender_health(&self.recommender).await;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for EpiCourierService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "epicourier".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("EpiCourier Meal Planner".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "EpiCourier - Recipe catalog, meal calendar, nutrition and recommendations. \
                 IMPORTANT: Call planner_instructions before planning meals. \
                 Ingredients: add_ingredient, search_ingredients. \
                 Recipes: create_recipe, add_recipe_ingredient, list_recipes, get_recipe. \
                 Tags: create_tag, search_tags, tag_recipe. \
                 Favorites and reviews: toggle_favorite, list_favorites, review_recipe, get_recipe_reviews, delete_review. \
                 Users: create_user, list_users. \
                 Calendar: add_calendar_entry, list_calendar, update_calendar_status, delete_calendar_entry. \
                 Nutrition: aggregate_nutrition, calendar_nutrition, compare_recipes. \
                 Insights: insights_activity, insights_recipe_counts, insights_recipe_trends. \
                 Recommendations: recommend_meals, recommender_health."
                    .into(),
            ),
        }
    }
}
