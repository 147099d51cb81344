//! Nutrition calculation module
//!
//! Default policy for missing data, the data-source seam, and aggregation.

pub mod aggregator;
pub mod defaults;
pub mod source;

pub use aggregator::{
    compute_aggregated_nutrition, fold_outcomes, recipe_nutrition, AggregatedNutrition,
    NutritionError, RecipeFetchOutcome, RecipeNutrition,
};
pub use defaults::{
    nutrient_or_default, recipe_name_or_default, weight_ratio, NUTRIENT_DEFAULT,
    RELATIVE_WEIGHT_BASE, RELATIVE_WEIGHT_DEFAULT, UNKNOWN_RECIPE_NAME,
};
pub use source::{NutritionSource, SourceError, SqliteNutritionSource};
