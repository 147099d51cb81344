//! User model
//!
//! Profile rows that own calendar entries. Credentials live with the external
//! auth provider and never touch this database.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub fullname: String,
    pub email: String,
}

impl User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            fullname: row.get("fullname")?,
            email: row.get("email")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &UserCreate) -> DbResult<Self> {
        let fullname = data.fullname.trim();
        let email = data.email.trim().to_lowercase();

        if fullname.is_empty() {
            return Err(DbError::Invalid("fullname cannot be empty".to_string()));
        }
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(DbError::Invalid(format!("'{}' is not an email address", email)));
        }

        conn.execute(
            "INSERT INTO users (fullname, email) VALUES (?1, ?2)",
            params![fullname, email],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("User {}", id)))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_by_email(conn: &Connection, email: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE email = ?1 LIMIT 1")?;

        match stmt.query_row([email.trim().to_lowercase()], Self::from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All users, oldest first
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users ORDER BY created_at ASC, id ASC")?;
        let users = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    #[test]
    fn test_create_normalizes_email() {
        let (_dir, db) = test_database();
        let conn = db.get_conn().unwrap();

        let user = User::create(
            &conn,
            &UserCreate {
                fullname: " Ada Lovelace ".to_string(),
                email: "Ada@Example.com".to_string(),
            },
        )
        .unwrap();
        assert_eq!(user.fullname, "Ada Lovelace");
        assert_eq!(user.email, "ada@example.com");

        let found = User::get_by_email(&conn, "ADA@example.com").unwrap().unwrap();
        assert_eq!(found, user);
        assert_eq!(User::list(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let (_dir, db) = test_database();
        let conn = db.get_conn().unwrap();

        let err = User::create(
            &conn,
            &UserCreate {
                fullname: "Nobody".to_string(),
                email: "not-an-email".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));

        let err = User::create(
            &conn,
            &UserCreate {
                fullname: "  ".to_string(),
                email: "a@b.c".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));
    }
}
