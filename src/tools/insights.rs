//! Insight MCP Tools
//!
//! Loads the relevant window of a user's calendar and hands it to the
//! grouping passes in `crate::insights`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::insights::{
    activity_window_start, daily_activity, recipe_counts as count_recipes, recipe_trends as trends,
    trends_window_start, DailyActivity, RecipeCount, RecipeTrends,
};
use crate::models::CalendarEntry;

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    /// First day counted; the window stays open so planned meals show up
    pub start: String,
    pub days: Vec<DailyActivity>,
}

fn load_entries(
    db: &Database,
    user_id: i64,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<CalendarEntry>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    CalendarEntry::list_for_user(&conn, user_id, start, end)
        .map_err(|e| format!("Failed to load calendar: {}", e))
}

/// Planned vs. completed meals per day from a year ago onward, including
/// meals planned for future dates
pub fn activity(db: &Database, user_id: i64, today: NaiveDate) -> Result<ActivityResponse, String> {
    let start = activity_window_start(today);
    let entries = load_entries(db, user_id, Some(start), None)?;

    Ok(ActivityResponse {
        start: start.format("%Y-%m-%d").to_string(),
        days: daily_activity(&entries),
    })
}

/// All-time planning counts per recipe
pub fn recipe_counts(db: &Database, user_id: i64) -> Result<Vec<RecipeCount>, String> {
    let entries = load_entries(db, user_id, None, None)?;
    Ok(count_recipes(&entries))
}

/// Weekly counts of the top recipes from six months ago onward, including
/// upcoming weeks that already have meals planned
pub fn recipe_trends(db: &Database, user_id: i64, today: NaiveDate) -> Result<RecipeTrends, String> {
    let entries = load_entries(db, user_id, Some(trends_window_start(today)), None)?;
    Ok(trends(&entries))
}
