//! Calendar entry model
//!
//! A recipe planned for a user on a date, with a completion flag.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::{Recipe, RecipeSummary, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// A calendar entry with its recipe summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
    pub date: String,
    pub meal_type: MealType,
    pub status: bool,
    pub notes: Option<String>,
    pub recipe: RecipeSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntryCreate {
    pub user_id: i64,
    pub recipe_id: i64,
    pub date: String,
    pub meal_type: MealType,
    pub notes: Option<String>,
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| DbError::Invalid(format!("'{}' is not a YYYY-MM-DD date: {}", value, e)))
}

const SELECT_WITH_RECIPE: &str = r#"
    SELECT c.id, c.user_id, c.recipe_id, c.date, c.meal_type, c.status, c.notes,
           r.name AS recipe_name, r.image_url, r.min_prep_time, r.green_score
    FROM calendar_entries c
    INNER JOIN recipes r ON r.id = c.recipe_id
"#;

const MEAL_ORDER: &str = "CASE c.meal_type \
    WHEN 'breakfast' THEN 0 WHEN 'lunch' THEN 1 WHEN 'dinner' THEN 2 ELSE 3 END";

impl CalendarEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type: String = row.get("meal_type")?;
        let recipe_id: i64 = row.get("recipe_id")?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            recipe_id,
            date: row.get("date")?,
            // The schema CHECK constraint only admits the four known values
            meal_type: MealType::parse(&meal_type).unwrap_or(MealType::Snack),
            status: row.get::<_, i32>("status")? != 0,
            notes: row.get("notes")?,
            recipe: RecipeSummary {
                id: recipe_id,
                name: row.get("recipe_name")?,
                image_url: row.get("image_url")?,
                min_prep_time: row.get("min_prep_time")?,
                green_score: row.get("green_score")?,
            },
        })
    }

    /// Plan a recipe on a date; new entries start incomplete
    pub fn create(conn: &Connection, data: &CalendarEntryCreate) -> DbResult<Self> {
        let date = parse_date(&data.date)?;

        if User::get_by_id(conn, data.user_id)?.is_none() {
            return Err(DbError::NotFound(format!("User {}", data.user_id)));
        }
        if Recipe::get_by_id(conn, data.recipe_id)?.is_none() {
            return Err(DbError::NotFound(format!("Recipe {}", data.recipe_id)));
        }

        conn.execute(
            r#"
            INSERT INTO calendar_entries (user_id, recipe_id, date, meal_type, status, notes)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            "#,
            params![
                data.user_id,
                data.recipe_id,
                date.format("%Y-%m-%d").to_string(),
                data.meal_type.as_str(),
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Calendar entry {}", id)))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let sql = format!("{} WHERE c.id = ?1", SELECT_WITH_RECIPE);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row([id], Self::from_row) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Entries for a user within optional inclusive date bounds, by date then meal order
    pub fn list_for_user(
        conn: &Connection,
        user_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> DbResult<Vec<Self>> {
        let sql = format!(
            r#"{}
            WHERE c.user_id = ?1
              AND (?2 IS NULL OR c.date >= ?2)
              AND (?3 IS NULL OR c.date <= ?3)
            ORDER BY c.date ASC, {} ASC, c.id ASC"#,
            SELECT_WITH_RECIPE, MEAL_ORDER
        );
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map(
                params![
                    user_id,
                    start.map(|d| d.format("%Y-%m-%d").to_string()),
                    end.map(|d| d.format("%Y-%m-%d").to_string()),
                ],
                Self::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Set completion status; `None` when the entry does not exist or belongs to someone else
    pub fn update_status(
        conn: &Connection,
        id: i64,
        user_id: i64,
        status: bool,
    ) -> DbResult<Option<Self>> {
        let rows = conn.execute(
            r#"
            UPDATE calendar_entries SET status = ?1, updated_at = datetime('now')
            WHERE id = ?2 AND user_id = ?3
            "#,
            params![status as i32, id, user_id],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, id)
    }

    /// Delete an entry owned by the user; returns false if nothing matched
    pub fn delete(conn: &Connection, id: i64, user_id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM calendar_entries WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}
