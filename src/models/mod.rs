//! Data models
//!
//! Rust structs representing database entities.

mod calendar;
mod favorite;
mod ingredient;
mod nutrition;
mod recipe;
mod recipe_ingredient;
mod review;
mod tag;
mod user;

pub use calendar::{parse_date, CalendarEntry, CalendarEntryCreate, MealType};
pub use favorite::Favorite;
pub use ingredient::{Ingredient, IngredientCreate};
pub use nutrition::{IngredientNutrients, NutrientVector, NUTRIENT_FIELD_COUNT};
pub use recipe::{Recipe, RecipeCreate, RecipeSummary};
pub use recipe_ingredient::{
    IngredientAssociation, RecipeIngredient, RecipeIngredientCreate, RecipeIngredientDetail,
};
pub use review::{Review, ReviewStats, ReviewUpsert, MAX_RATING, MIN_RATING};
pub use tag::{Tag, TagCreate};
pub use user::{User, UserCreate};
