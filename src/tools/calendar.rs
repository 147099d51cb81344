//! User and Calendar MCP Tools
//!
//! Tools for managing user profiles and planning meals on the calendar.

use serde::Serialize;

use crate::db::Database;
use crate::models::{parse_date, CalendarEntry, CalendarEntryCreate, MealType, User, UserCreate};

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub entry: CalendarEntry,
}

#[derive(Debug, Serialize)]
pub struct DeleteEntryResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Returned instead of an error when the entry is missing or owned by another user
#[derive(Debug, Serialize)]
pub struct EntryNotFoundResponse {
    pub error: String,
    pub id: i64,
}

impl EntryNotFoundResponse {
    fn new(id: i64) -> Self {
        Self {
            error: "Entry not found or user unauthorized".to_string(),
            id,
        }
    }
}

// ============================================================================
// User Tools
// ============================================================================

pub fn create_user(db: &Database, data: UserCreate) -> Result<User, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if User::get_by_email(&conn, &data.email)
        .map_err(|e| format!("Failed to check email: {}", e))?
        .is_some()
    {
        return Err(format!("A user with email {} already exists", data.email.trim()));
    }

    User::create(&conn, &data).map_err(|e| format!("Failed to create user: {}", e))
}

pub fn list_users(db: &Database) -> Result<Vec<User>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    User::list(&conn).map_err(|e| format!("Failed to list users: {}", e))
}

// ============================================================================
// Calendar Tools
// ============================================================================

/// Plan a recipe for a user on a date
pub fn add_calendar_entry(
    db: &Database,
    user_id: i64,
    recipe_id: i64,
    date: &str,
    meal_type: &str,
    notes: Option<String>,
) -> Result<CalendarEntry, String> {
    let meal_type = MealType::parse(meal_type).ok_or_else(|| {
        format!("Invalid meal_type '{}': expected breakfast, lunch, dinner or snack", meal_type)
    })?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = CalendarEntryCreate {
        user_id,
        recipe_id,
        date: date.to_string(),
        meal_type,
        notes: notes.filter(|n| !n.trim().is_empty()),
    };
    CalendarEntry::create(&conn, &data).map_err(|e| format!("Failed to add calendar entry: {}", e))
}

/// List a user's calendar, optionally bounded by inclusive start/end dates
pub fn list_calendar(
    db: &Database,
    user_id: i64,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<CalendarEntry>, String> {
    let start = start.map(parse_date).transpose().map_err(|e| e.to_string())?;
    let end = end.map(parse_date).transpose().map_err(|e| e.to_string())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    CalendarEntry::list_for_user(&conn, user_id, start, end)
        .map_err(|e| format!("Failed to list calendar: {}", e))
}

/// Mark a planned meal as eaten (or not)
pub fn update_calendar_status(
    db: &Database,
    id: i64,
    user_id: i64,
    status: bool,
) -> Result<Result<UpdateStatusResponse, EntryNotFoundResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = CalendarEntry::update_status(&conn, id, user_id, status)
        .map_err(|e| format!("Failed to update entry: {}", e))?;

    Ok(match updated {
        Some(entry) => Ok(UpdateStatusResponse {
            success: true,
            entry,
        }),
        None => Err(EntryNotFoundResponse::new(id)),
    })
}

pub fn delete_calendar_entry(
    db: &Database,
    id: i64,
    user_id: i64,
) -> Result<Result<DeleteEntryResponse, EntryNotFoundResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = CalendarEntry::delete(&conn, id, user_id)
        .map_err(|e| format!("Failed to delete entry: {}", e))?;

    Ok(if deleted {
        Ok(DeleteEntryResponse {
            success: true,
            deleted_id: id,
        })
    } else {
        Err(EntryNotFoundResponse::new(id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::RecipeCreate;
    use crate::tools::recipes::create_recipe;

    fn setup(db: &Database) -> (i64, i64) {
        let user = create_user(
            db,
            UserCreate {
                fullname: "Kai".to_string(),
                email: "kai@example.com".to_string(),
            },
        )
        .unwrap();
        let recipe = create_recipe(
            db,
            RecipeCreate {
                name: "Shakshuka".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        (user.id, recipe.id)
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (_dir, db) = test_database();
        setup(&db);
        let err = create_user(
            &db,
            UserCreate {
                fullname: "Other Kai".to_string(),
                email: "KAI@example.com".to_string(),
            },
        )
        .unwrap_err();
        assert!(err.contains("already exists"));
        assert_eq!(list_users(&db).unwrap().len(), 1);
    }

    #[test]
    fn test_plan_and_complete_meal() {
        let (_dir, db) = test_database();
        let (user_id, recipe_id) = setup(&db);

        let entry = add_calendar_entry(&db, user_id, recipe_id, "2025-05-01", "Breakfast", Some(" ".into())).unwrap();
        assert_eq!(entry.meal_type, MealType::Breakfast);
        assert!(entry.notes.is_none());
        assert_eq!(entry.recipe.name.as_deref(), Some("Shakshuka"));

        let done = update_calendar_status(&db, entry.id, user_id, true).unwrap().unwrap();
        assert!(done.entry.status);

        let stranger = update_calendar_status(&db, entry.id, user_id + 1, false).unwrap();
        assert!(stranger.is_err());

        let listed = list_calendar(&db, user_id, Some("2025-05-01"), None).unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].status);

        assert!(delete_calendar_entry(&db, entry.id, user_id).unwrap().is_ok());
        assert!(list_calendar(&db, user_id, None, None).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_inputs() {
        let (_dir, db) = test_database();
        let (user_id, recipe_id) = setup(&db);

        assert!(add_calendar_entry(&db, user_id, recipe_id, "2025-05-01", "brunch", None).is_err());
        assert!(add_calendar_entry(&db, user_id, recipe_id, "tomorrow", "lunch", None).is_err());
        assert!(add_calendar_entry(&db, user_id, recipe_id + 1, "2025-05-01", "lunch", None).is_err());
        assert!(list_calendar(&db, user_id, Some("2025-13-01"), None).is_err());
    }
}
