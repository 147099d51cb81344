//! Recipe tags

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::Recipe;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagCreate {
    pub name: String,
    pub description: Option<String>,
}

impl Tag {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &TagCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO tags (name, description) VALUES (?1, ?2)",
            params![data.name.trim(), data.description],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Tag {}", id)))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM tags WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(tag) => Ok(Some(tag)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Return the tag with this name, creating it if needed
    pub fn get_or_create(conn: &Connection, name: &str) -> DbResult<Self> {
        let name = name.trim();
        let mut stmt = conn.prepare("SELECT * FROM tags WHERE name = ?1 COLLATE NOCASE")?;
        match stmt.query_row([name], Self::from_row) {
            Ok(tag) => Ok(tag),
            Err(rusqlite::Error::QueryReturnedNoRows) => Self::create(
                conn,
                &TagCreate {
                    name: name.to_string(),
                    description: None,
                },
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Tags ordered by id, optionally filtered by name
    pub fn search(conn: &Connection, query: Option<&str>, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query.map(str::trim).unwrap_or(""));
        let mut stmt = conn.prepare(
            "SELECT * FROM tags WHERE name LIKE ?1 ORDER BY id ASC LIMIT ?2 OFFSET ?3",
        )?;

        let tags = stmt
            .query_map(params![pattern, limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tags)
    }

    pub fn count(conn: &Connection, query: Option<&str>) -> DbResult<i64> {
        let pattern = format!("%{}%", query.map(str::trim).unwrap_or(""));
        let count = conn.query_row(
            "SELECT COUNT(*) FROM tags WHERE name LIKE ?1",
            [pattern],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Attach a tag to a recipe; attaching twice is a no-op
    pub fn attach(conn: &Connection, recipe_id: i64, tag_id: i64) -> DbResult<()> {
        if Recipe::get_by_id(conn, recipe_id)?.is_none() {
            return Err(DbError::NotFound(format!("Recipe {}", recipe_id)));
        }
        if Self::get_by_id(conn, tag_id)?.is_none() {
            return Err(DbError::NotFound(format!("Tag {}", tag_id)));
        }

        conn.execute(
            "INSERT OR IGNORE INTO recipe_tags (recipe_id, tag_id) VALUES (?1, ?2)",
            params![recipe_id, tag_id],
        )?;
        Ok(())
    }

    pub fn list_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT t.* FROM tags t
            INNER JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = ?1
            ORDER BY t.id
            "#,
        )?;

        let tags = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tags)
    }
}
