//! Nutrition aggregation across recipes
//!
//! Computes per-recipe nutrient totals from weighted ingredient rows, then a
//! total and an average across every recipe that could be loaded.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{IngredientAssociation, NutrientVector};
use super::defaults::{recipe_name_or_default, weight_ratio};
use super::source::{NutritionSource, SourceError};

#[derive(Debug, Error)]
pub enum NutritionError {
    /// The batched recipe lookup failed; nothing was aggregated
    #[error("Unable to load nutrition data: {0}")]
    DataFetch(#[source] SourceError),
}

/// Nutrition of a single recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeNutrition {
    pub recipe_id: i64,
    pub recipe_name: String,
    pub nutrition: NutrientVector,
}

/// Totals and averages over a set of recipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedNutrition {
    pub total: NutrientVector,
    pub average: NutrientVector,
    /// In request order, one entry per successfully loaded id (duplicates included)
    pub recipes: Vec<RecipeNutrition>,
}

/// Result of loading one requested recipe
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeFetchOutcome {
    Fetched(RecipeNutrition),
    Failed { recipe_id: i64, reason: String },
}

/// Weighted sum of a recipe's ingredient rows
pub fn recipe_nutrition(associations: &[IngredientAssociation]) -> NutrientVector {
    associations
        .iter()
        .map(|a| NutrientVector::from_ingredient(&a.ingredient).scale(weight_ratio(a.relative_weight)))
        .sum()
}

/// Fold fetch outcomes into an aggregate, dropping failures
pub fn fold_outcomes(outcomes: Vec<RecipeFetchOutcome>) -> AggregatedNutrition {
    let mut recipes = Vec::with_capacity(outcomes.len());

    for outcome in outcomes {
        match outcome {
            RecipeFetchOutcome::Fetched(recipe) => recipes.push(recipe),
            RecipeFetchOutcome::Failed { recipe_id, reason } => {
                warn!(recipe_id, %reason, "Skipping recipe in nutrition aggregate");
            }
        }
    }

    let total: NutrientVector = recipes.iter().map(|r| &r.nutrition).sum();
    let average = total.divide(recipes.len());

    AggregatedNutrition {
        total,
        average,
        recipes,
    }
}

/// Aggregate nutrition for the given recipes.
///
/// Returns `Ok(None)` for an empty request: there is nothing to display, which
/// is different from a zero-filled aggregate. A failed name lookup fails the
/// whole call; a failed ingredient lookup only drops that recipe. Duplicate ids
/// are counted once per occurrence.
pub async fn compute_aggregated_nutrition(
    recipe_ids: &[i64],
    source: &dyn NutritionSource,
) -> Result<Option<AggregatedNutrition>, NutritionError> {
    if recipe_ids.is_empty() {
        return Ok(None);
    }

    let names = source
        .fetch_recipe_names(recipe_ids)
        .await
        .map_err(NutritionError::DataFetch)?;

    let fetches = recipe_ids.iter().map(|&recipe_id| {
        let name = names.get(&recipe_id).cloned();
        async move {
            let Some(name) = name else {
                return RecipeFetchOutcome::Failed {
                    recipe_id,
                    reason: "recipe not found".to_string(),
                };
            };

            match source.fetch_ingredient_associations(recipe_id).await {
                Ok(associations) => {
                    debug!(recipe_id, ingredients = associations.len(), "Loaded recipe ingredients");
                    RecipeFetchOutcome::Fetched(RecipeNutrition {
                        recipe_id,
                        recipe_name: recipe_name_or_default(name.as_deref()),
                        nutrition: recipe_nutrition(&associations),
                    })
                }
                Err(e) => RecipeFetchOutcome::Failed {
                    recipe_id,
                    reason: e.to_string(),
                },
            }
        }
    });

    let outcomes = join_all(fetches).await;
    Ok(Some(fold_outcomes(outcomes)))
}
