//! Favorite recipes
//!
//! A user either has a recipe starred or not; toggling flips it.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::{Recipe, RecipeSummary, User};

/// A starred recipe with its summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: i64,
    pub recipe_id: i64,
    pub created_at: String,
    pub recipe: RecipeSummary,
}

impl Favorite {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let recipe_id: i64 = row.get("recipe_id")?;
        Ok(Self {
            user_id: row.get("user_id")?,
            recipe_id,
            created_at: row.get("created_at")?,
            recipe: RecipeSummary {
                id: recipe_id,
                name: row.get("recipe_name")?,
                image_url: row.get("image_url")?,
                min_prep_time: row.get("min_prep_time")?,
                green_score: row.get("green_score")?,
            },
        })
    }

    /// Star the recipe if it is not starred, unstar it otherwise.
    /// Returns whether the recipe is a favorite afterwards.
    pub fn toggle(conn: &Connection, user_id: i64, recipe_id: i64) -> DbResult<bool> {
        if User::get_by_id(conn, user_id)?.is_none() {
            return Err(DbError::NotFound(format!("User {}", user_id)));
        }
        if Recipe::get_by_id(conn, recipe_id)?.is_none() {
            return Err(DbError::NotFound(format!("Recipe {}", recipe_id)));
        }

        let removed = conn.execute(
            "DELETE FROM favorites WHERE user_id = ?1 AND recipe_id = ?2",
            params![user_id, recipe_id],
        )?;
        if removed > 0 {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO favorites (user_id, recipe_id) VALUES (?1, ?2)",
            params![user_id, recipe_id],
        )?;
        Ok(true)
    }

    /// A user's favorites, most recently starred first
    pub fn list_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT f.user_id, f.recipe_id, f.created_at,
                   r.name AS recipe_name, r.image_url, r.min_prep_time, r.green_score
            FROM favorites f
            INNER JOIN recipes r ON r.id = f.recipe_id
            WHERE f.user_id = ?1
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )?;

        let favorites = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(favorites)
    }

    pub fn is_favorite(conn: &Connection, user_id: i64, recipe_id: i64) -> DbResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM favorites WHERE user_id = ?1 AND recipe_id = ?2",
            params![user_id, recipe_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{RecipeCreate, UserCreate};

    #[test]
    fn test_toggle_round_trip() {
        let (_dir, db) = test_database();
        let conn = db.get_conn().unwrap();
        let user = User::create(
            &conn,
            &UserCreate {
                fullname: "Kim".to_string(),
                email: "kim@example.com".to_string(),
            },
        )
        .unwrap();
        let mut ids = Vec::new();
        for name in ["Pho", "Curry"] {
            let recipe = Recipe::create(
                &conn,
                &RecipeCreate {
                    name: name.to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
            ids.push(recipe.id);
        }

        assert!(Favorite::toggle(&conn, user.id, ids[0]).unwrap());
        assert!(Favorite::toggle(&conn, user.id, ids[1]).unwrap());
        assert!(Favorite::is_favorite(&conn, user.id, ids[0]).unwrap());

        let listed: Vec<i64> = Favorite::list_for_user(&conn, user.id)
            .unwrap()
            .iter()
            .map(|f| f.recipe_id)
            .collect();
        assert_eq!(listed, vec![ids[1], ids[0]]);

        assert!(!Favorite::toggle(&conn, user.id, ids[0]).unwrap());
        assert!(!Favorite::is_favorite(&conn, user.id, ids[0]).unwrap());
        let remaining = Favorite::list_for_user(&conn, user.id).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].recipe.name.as_deref(), Some("Curry"));
    }

    #[test]
    fn test_toggle_unknown_rows() {
        let (_dir, db) = test_database();
        let conn = db.get_conn().unwrap();
        assert!(matches!(Favorite::toggle(&conn, 1, 1), Err(DbError::NotFound(_))));
    }
}
