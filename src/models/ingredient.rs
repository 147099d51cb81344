//! Ingredient model
//!
//! Base nutrient data per 100 reference units (grams unless `unit` says otherwise).

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::IngredientNutrients;

/// An ingredient with its reference nutrient values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: Option<String>,
    pub unit: String,
    #[serde(flatten)]
    pub nutrients: IngredientNutrients,
    pub created_at: String,
}

/// Data for creating a new ingredient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientCreate {
    pub name: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(flatten)]
    pub nutrients: IngredientNutrients,
}

fn default_unit() -> String {
    "g".to_string()
}

impl Ingredient {
    /// Read the nutrient columns of a row; aliases are not used so joins must select them by name
    pub(crate) fn nutrients_from_row(row: &Row) -> rusqlite::Result<IngredientNutrients> {
        Ok(IngredientNutrients {
            calories_kcal: row.get("calories_kcal")?,
            protein_g: row.get("protein_g")?,
            carbs_g: row.get("carbs_g")?,
            sugars_g: row.get("sugars_g")?,
            agg_fats_g: row.get("agg_fats_g")?,
            cholesterol_mg: row.get("cholesterol_mg")?,
            agg_minerals_mg: row.get("agg_minerals_mg")?,
            vit_a_microg: row.get("vit_a_microg")?,
            agg_vit_b_mg: row.get("agg_vit_b_mg")?,
            vit_c_mg: row.get("vit_c_mg")?,
            vit_d_microg: row.get("vit_d_microg")?,
            vit_e_mg: row.get("vit_e_mg")?,
            vit_k_microg: row.get("vit_k_microg")?,
        })
    }

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            unit: row.get("unit")?,
            nutrients: Self::nutrients_from_row(row)?,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a new ingredient
    pub fn create(conn: &Connection, data: &IngredientCreate) -> DbResult<Self> {
        let n = &data.nutrients;
        conn.execute(
            r#"
            INSERT INTO ingredients (
                name, unit, calories_kcal, protein_g, carbs_g, sugars_g, agg_fats_g,
                cholesterol_mg, agg_minerals_mg, vit_a_microg, agg_vit_b_mg, vit_c_mg,
                vit_d_microg, vit_e_mg, vit_k_microg
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                data.name,
                data.unit,
                n.calories_kcal,
                n.protein_g,
                n.carbs_g,
                n.sugars_g,
                n.agg_fats_g,
                n.cholesterol_mg,
                n.agg_minerals_mg,
                n.vit_a_microg,
                n.agg_vit_b_mg,
                n.vit_c_mg,
                n.vit_d_microg,
                n.vit_e_mg,
                n.vit_k_microg,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Ingredient {}", id)))
    }

    /// Get an ingredient by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(ingredient) => Ok(Some(ingredient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Find an ingredient by exact (case-insensitive) name
    pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM ingredients WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
        )?;

        match stmt.query_row([name], Self::from_row) {
            Ok(ingredient) => Ok(Some(ingredient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search ingredients by name
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query.trim());
        let mut stmt = conn.prepare(
            "SELECT * FROM ingredients WHERE name LIKE ?1 ORDER BY name LIMIT ?2",
        )?;

        let ingredients = stmt
            .query_map(params![pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    #[test]
    fn test_create_keeps_null_nutrients() {
        let (_dir, db) = test_database();
        let conn = db.get_conn().unwrap();

        let created = Ingredient::create(
            &conn,
            &IngredientCreate {
                name: "Spinach".to_string(),
                unit: "g".to_string(),
                nutrients: IngredientNutrients {
                    calories_kcal: Some(23.0),
                    vit_k_microg: Some(483.0),
                    ..Default::default()
                },
            },
        )
        .unwrap();

        assert_eq!(created.name.as_deref(), Some("Spinach"));
        assert_eq!(created.nutrients.calories_kcal, Some(23.0));
        assert_eq!(created.nutrients.protein_g, None);

        let found = Ingredient::get_by_name(&conn, "spinach").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(Ingredient::search(&conn, "pin", 10).unwrap().len(), 1);
        assert!(Ingredient::get_by_id(&conn, created.id + 1).unwrap().is_none());
    }
}
