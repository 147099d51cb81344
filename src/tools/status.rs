//! EpiCourier Status Tool
//!
//! Provides runtime status information and the planner usage guide.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Meal planning instructions for AI assistants
pub const PLANNER_INSTRUCTIONS: &str = r#"
# EpiCourier Meal Planning Instructions

This guide explains how to plan meals and review nutrition with the EpiCourier tools.

## Overview

The planner is built from:
1. **Ingredients** - Nutrient values per 100 units of the ingredient
2. **Recipes** - Ingredients with a relative weight (`relative_unit_100`, 100 = one base portion)
3. **Tags** - Labels such as "vegan" or "quick" used to filter recipes
4. **Users** - Each user owns a personal meal calendar
5. **Calendar entries** - A recipe planned for a date and meal type

---

## Building the Catalog

```
add_ingredient(name: "Chickpeas", calories_kcal: 164, protein_g: 8.9, carbs_g: 27.4)
create_recipe(name: "Hummus", min_prep_time: 10, green_score: 4.5)
add_recipe_ingredient(recipe_id: 1, ingredient_id: 1, relative_unit_100: 150)
tag_recipe(recipe_id: 1, tag: "vegan")
```

A missing `relative_unit_100` counts as 100 (one base portion). Missing nutrient values count as 0.

## Finding Recipes

```
list_recipes(query: "hummus", page: 1, limit: 20)
list_recipes(ingredient_ids: [1, 4])
list_recipes(tag_ids: [2])
search_tags(query: "veg")
get_recipe(id: 1)
```

When both ingredient and tag filters are given, only the ingredient filter applies.
`get_recipe` returns ingredients, tags and the summed nutrients of the recipe.

```
compare_recipes(recipe_ids: [1, 4, 9])
```

Compares up to 3 distinct recipes side by side: details, summed nutrients and ratings.

## Favorites and Reviews

```
toggle_favorite(user_id: 1, recipe_id: 4)
list_favorites(user_id: 1)
review_recipe(user_id: 1, recipe_id: 4, rating: 5, comment: "Weeknight staple")
get_recipe_reviews(recipe_id: 4)
delete_review(user_id: 1, recipe_id: 4)
```

`toggle_favorite` stars an unstarred recipe and unstars a starred one.
Ratings run from 1 to 5; reviewing the same recipe again edits the earlier review.

## Planning Meals

```
create_user(fullname: "Sam Doe", email: "sam@example.com")
add_calendar_entry(user_id: 1, recipe_id: 1, date: "2026-01-13", meal_type: "lunch")
list_calendar(user_id: 1, start: "2026-01-12", end: "2026-01-18")
update_calendar_status(id: 7, user_id: 1, status: true)
delete_calendar_entry(id: 7, user_id: 1)
```

Meal types: `breakfast`, `lunch`, `dinner`, `snack`. Dates use ISO format: YYYY-MM-DD.
Status `true` means the meal was eaten.

## Nutrition

```
aggregate_nutrition(recipe_ids: [1, 1, 3])
calendar_nutrition(user_id: 1, start: "2026-01-12", end: "2026-01-18")
```

Each id counts once per occurrence. Recipes that cannot be loaded are skipped;
the average is taken over the recipes that loaded.

## Insights

| Task | Tool |
|------|------|
| Daily planned vs. eaten (from a year ago, upcoming days included) | `insights_activity` |
| How often each recipe was planned | `insights_recipe_counts` |
| Weekly counts for the top 5 recipes (from 6 months ago, upcoming weeks included) | `insights_recipe_trends` |

## Recommendations

```
recommend_meals(goal: "high protein vegetarian dinners", num_meals: 3)
```

`num_meals` must be between 1 and 10. Requests go to the recommender backend
shown by `epicourier_status`.
"#;

/// Runtime status of the EpiCourier service
#[derive(Debug, Clone, Serialize)]
pub struct EpiCourierStatus {
    /// Build information
    pub version: &'static str,
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    /// Schema this build migrates catalogs to
    pub schema_version: i32,

    pub backend_url: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    backend_url: String,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, backend_url: String) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            backend_url,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> EpiCourierStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        EpiCourierStatus {
            version: build_info.version,
            build_profile: build_info.build_profile,
            build_timestamp: build_info.build_timestamp,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version: build_info.schema_version,
            backend_url: self.backend_url.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_missing_database() {
        let tracker = StatusTracker::new(
            PathBuf::from("/nonexistent/epicourier.db"),
            "http://localhost:8000".to_string(),
        );
        let status = tracker.get_status();
        assert!(status.database_size_bytes.is_none());
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.backend_url, "http://localhost:8000");
        assert_eq!(status.schema_version, crate::db::migrations::SCHEMA_VERSION);
    }
}
