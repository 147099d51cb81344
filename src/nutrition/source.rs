//! Data access capability for the nutrition aggregator
//!
//! The aggregator never reaches for a database itself; callers hand it a
//! `NutritionSource`, which production code backs with SQLite and tests back
//! with in-memory fakes.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{IngredientAssociation, Recipe, RecipeIngredient};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Unavailable(String),
}

/// Where recipe names and ingredient rows come from
#[async_trait]
pub trait NutritionSource: Send + Sync {
    /// Batched name lookup. Unknown ids are simply absent; stored names may be NULL.
    async fn fetch_recipe_names(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, Option<String>>, SourceError>;

    /// Weighted ingredient rows for one recipe
    async fn fetch_ingredient_associations(
        &self,
        recipe_id: i64,
    ) -> Result<Vec<IngredientAssociation>, SourceError>;
}

/// `NutritionSource` over the local catalog database
#[derive(Clone)]
pub struct SqliteNutritionSource {
    database: Database,
}

impl SqliteNutritionSource {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl NutritionSource for SqliteNutritionSource {
    async fn fetch_recipe_names(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, Option<String>>, SourceError> {
        let database = self.database.clone();
        let ids = ids.to_vec();
        let names = tokio::task::spawn_blocking(move || {
            database.with_conn(|conn| Recipe::get_names(conn, &ids))
        })
        .await??;
        Ok(names)
    }

    async fn fetch_ingredient_associations(
        &self,
        recipe_id: i64,
    ) -> Result<Vec<IngredientAssociation>, SourceError> {
        let database = self.database.clone();
        let associations = tokio::task::spawn_blocking(move || {
            database.with_conn(|conn| RecipeIngredient::get_associations_for_recipe(conn, recipe_id))
        })
        .await??;
        Ok(associations)
    }
}
