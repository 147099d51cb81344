//! Recipe reviews
//!
//! Each user holds at most one review per recipe: a 1 to 5 star rating and an
//! optional comment. Submitting again edits the existing review.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::{Recipe, User};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    /// Reviewer's full name
    pub reviewer: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewUpsert {
    pub user_id: i64,
    pub recipe_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

/// Rating summary for one recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    /// Mean rating rounded to one decimal; 0 without reviews
    pub average_rating: f64,
    pub total_reviews: usize,
    /// Review count per star value, every value from 1 to 5 present
    pub rating_distribution: BTreeMap<i64, usize>,
}

impl ReviewStats {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut rating_distribution: BTreeMap<i64, usize> =
            (MIN_RATING..=MAX_RATING).map(|rating| (rating, 0)).collect();
        for review in reviews {
            *rating_distribution.entry(review.rating).or_insert(0) += 1;
        }

        let average_rating = if reviews.is_empty() {
            0.0
        } else {
            let sum: i64 = reviews.iter().map(|r| r.rating).sum();
            (sum as f64 / reviews.len() as f64 * 10.0).round() / 10.0
        };

        Self {
            average_rating,
            total_reviews: reviews.len(),
            rating_distribution,
        }
    }
}

const SELECT_WITH_REVIEWER: &str = r#"
    SELECT v.id, v.user_id, v.recipe_id, v.rating, v.comment, v.created_at, v.updated_at,
           u.fullname AS reviewer
    FROM reviews v
    INNER JOIN users u ON u.id = v.user_id
"#;

impl Review {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            recipe_id: row.get("recipe_id")?,
            rating: row.get("rating")?,
            comment: row.get("comment")?,
            reviewer: row.get("reviewer")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create the user's review of a recipe, or replace its rating and comment.
    /// Blank comments are stored as NULL.
    pub fn upsert(conn: &Connection, data: &ReviewUpsert) -> DbResult<Self> {
        if !(MIN_RATING..=MAX_RATING).contains(&data.rating) {
            return Err(DbError::Invalid(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, data.rating
            )));
        }
        if User::get_by_id(conn, data.user_id)?.is_none() {
            return Err(DbError::NotFound(format!("User {}", data.user_id)));
        }
        if Recipe::get_by_id(conn, data.recipe_id)?.is_none() {
            return Err(DbError::NotFound(format!("Recipe {}", data.recipe_id)));
        }

        let comment = data
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        conn.execute(
            r#"
            INSERT INTO reviews (user_id, recipe_id, rating, comment)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, recipe_id) DO UPDATE SET
                rating = excluded.rating,
                comment = excluded.comment,
                updated_at = datetime('now')
            "#,
            params![data.user_id, data.recipe_id, data.rating, comment],
        )?;

        Self::get_for_user(conn, data.user_id, data.recipe_id)?.ok_or_else(|| {
            DbError::NotFound(format!("Review of recipe {} by user {}", data.recipe_id, data.user_id))
        })
    }

    pub fn get_for_user(conn: &Connection, user_id: i64, recipe_id: i64) -> DbResult<Option<Self>> {
        let sql = format!("{} WHERE v.user_id = ?1 AND v.recipe_id = ?2", SELECT_WITH_REVIEWER);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![user_id, recipe_id], Self::from_row) {
            Ok(review) => Ok(Some(review)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reviews of a recipe, newest first
    pub fn list_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let sql = format!(
            "{} WHERE v.recipe_id = ?1 ORDER BY v.created_at DESC, v.id DESC",
            SELECT_WITH_REVIEWER
        );
        let mut stmt = conn.prepare(&sql)?;

        let reviews = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reviews)
    }

    /// Remove the user's review; false when there was none
    pub fn delete(conn: &Connection, user_id: i64, recipe_id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM reviews WHERE user_id = ?1 AND recipe_id = ?2",
            params![user_id, recipe_id],
        )?;
        Ok(rows > 0)
    }
}
