//! Recipe ingredient associations
//!
//! Links an ingredient to a recipe with a relative weight in parts per 100.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::{Ingredient, IngredientNutrients, Recipe};

/// One ingredient's weighted contribution to a recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientAssociation {
    pub relative_weight: Option<f64>,
    pub ingredient: IngredientNutrients,
}

/// Association with full ingredient details, for recipe detail views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredientDetail {
    pub relative_unit_100: Option<f64>,
    pub ingredient: Ingredient,
}

/// Data for adding an ingredient to a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredientCreate {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub relative_unit_100: Option<f64>,
}

impl From<&RecipeIngredientDetail> for IngredientAssociation {
    fn from(detail: &RecipeIngredientDetail) -> Self {
        Self {
            relative_weight: detail.relative_unit_100,
            ingredient: detail.ingredient.nutrients.clone(),
        }
    }
}

pub struct RecipeIngredient;

impl RecipeIngredient {
    /// Link an ingredient to a recipe; returns the association id
    pub fn create(conn: &Connection, data: &RecipeIngredientCreate) -> DbResult<i64> {
        if Recipe::get_by_id(conn, data.recipe_id)?.is_none() {
            return Err(DbError::NotFound(format!("Recipe {}", data.recipe_id)));
        }
        if Ingredient::get_by_id(conn, data.ingredient_id)?.is_none() {
            return Err(DbError::NotFound(format!("Ingredient {}", data.ingredient_id)));
        }

        conn.execute(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, relative_unit_100)
            VALUES (?1, ?2, ?3)
            "#,
            params![data.recipe_id, data.ingredient_id, data.relative_unit_100],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Associations for a recipe with their ingredients, in insertion order
    pub fn get_details_for_recipe(
        conn: &Connection,
        recipe_id: i64,
    ) -> DbResult<Vec<RecipeIngredientDetail>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT ri.relative_unit_100, i.*
            FROM recipe_ingredients ri
            INNER JOIN ingredients i ON ri.ingredient_id = i.id
            WHERE ri.recipe_id = ?1
            ORDER BY ri.id
            "#,
        )?;

        let details = stmt
            .query_map([recipe_id], |row| {
                Ok(RecipeIngredientDetail {
                    relative_unit_100: row.get("relative_unit_100")?,
                    ingredient: Ingredient::from_row(row)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(details)
    }

    /// Weight and nutrient rows only, as consumed by the aggregator
    pub fn get_associations_for_recipe(
        conn: &Connection,
        recipe_id: i64,
    ) -> DbResult<Vec<IngredientAssociation>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT ri.relative_unit_100,
                   i.calories_kcal, i.protein_g, i.carbs_g, i.sugars_g, i.agg_fats_g,
                   i.cholesterol_mg, i.agg_minerals_mg, i.vit_a_microg, i.agg_vit_b_mg,
                   i.vit_c_mg, i.vit_d_microg, i.vit_e_mg, i.vit_k_microg
            FROM recipe_ingredients ri
            INNER JOIN ingredients i ON ri.ingredient_id = i.id
            WHERE ri.recipe_id = ?1
            ORDER BY ri.id
            "#,
        )?;

        let associations = stmt
            .query_map([recipe_id], |row| {
                Ok(IngredientAssociation {
                    relative_weight: row.get("relative_unit_100")?,
                    ingredient: Ingredient::nutrients_from_row(row)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(associations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{IngredientCreate, RecipeCreate};

    #[test]
    fn test_associations_roundtrip_with_null_weight() {
        let (_dir, db) = test_database();
        let conn = db.get_conn().unwrap();

        let recipe = Recipe::create(
            &conn,
            &RecipeCreate {
                name: "Omelette".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        let egg = Ingredient::create(
            &conn,
            &IngredientCreate {
                name: "Egg".to_string(),
                unit: "g".to_string(),
                nutrients: IngredientNutrients {
                    calories_kcal: Some(143.0),
                    protein_g: Some(12.6),
                    ..Default::default()
                },
            },
        )
        .unwrap();

        RecipeIngredient::create(
            &conn,
            &RecipeIngredientCreate {
                recipe_id: recipe.id,
                ingredient_id: egg.id,
                relative_unit_100: None,
            },
        )
        .unwrap();
        RecipeIngredient::create(
            &conn,
            &RecipeIngredientCreate {
                recipe_id: recipe.id,
                ingredient_id: egg.id,
                relative_unit_100: Some(50.0),
            },
        )
        .unwrap();

        let associations = RecipeIngredient::get_associations_for_recipe(&conn, recipe.id).unwrap();
        assert_eq!(associations.len(), 2);
        assert_eq!(associations[0].relative_weight, None);
        assert_eq!(associations[1].relative_weight, Some(50.0));
        assert_eq!(associations[0].ingredient.protein_g, Some(12.6));
        assert_eq!(associations[0].ingredient.sugars_g, None);

        let details = RecipeIngredient::get_details_for_recipe(&conn, recipe.id).unwrap();
        assert_eq!(details[0].ingredient.name.as_deref(), Some("Egg"));
    }

    #[test]
    fn test_create_rejects_unknown_recipe() {
        let (_dir, db) = test_database();
        let conn = db.get_conn().unwrap();

        let err = RecipeIngredient::create(
            &conn,
            &RecipeIngredientCreate {
                recipe_id: 42,
                ingredient_id: 1,
                relative_unit_100: Some(100.0),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }
}
