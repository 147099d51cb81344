//! Calendar insights
//!
//! Grouping passes over a user's calendar entries for the activity heatmap,
//! per-recipe popularity, and weekly trend charts.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::models::{parse_date, CalendarEntry, RecipeSummary};
use crate::nutrition::recipe_name_or_default;

/// Trends only chart this many recipes
pub const TOP_RECIPE_LIMIT: usize = 5;

/// Planned and completed meals on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyActivity {
    pub date: String,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeCount {
    pub recipe: RecipeSummary,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopRecipe {
    pub id: i64,
    pub name: String,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeWeekCount {
    pub recipe_id: i64,
    pub name: String,
    pub count: usize,
}

/// One chart point: the Monday of the week and a count per top recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyTrend {
    pub week: String,
    pub counts: Vec<RecipeWeekCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipeTrends {
    pub top_recipes: Vec<TopRecipe>,
    pub trends: Vec<WeeklyTrend>,
}

/// First day of the activity window: one year before `today`
pub fn activity_window_start(today: NaiveDate) -> NaiveDate {
    today.checked_sub_months(Months::new(12)).unwrap_or(NaiveDate::MIN)
}

/// First day of the trends window: six months before `today`
pub fn trends_window_start(today: NaiveDate) -> NaiveDate {
    today.checked_sub_months(Months::new(6)).unwrap_or(NaiveDate::MIN)
}

/// Monday of the ISO week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Per-day totals, ascending by date
pub fn daily_activity(entries: &[CalendarEntry]) -> Vec<DailyActivity> {
    let mut by_date: BTreeMap<&str, (usize, usize)> = BTreeMap::new();

    for entry in entries {
        let counts = by_date.entry(entry.date.as_str()).or_default();
        counts.0 += 1;
        if entry.status {
            counts.1 += 1;
        }
    }

    by_date
        .into_iter()
        .map(|(date, (total, completed))| DailyActivity {
            date: date.to_string(),
            total,
            completed,
        })
        .collect()
}

/// How often each recipe was planned, most frequent first (ties by recipe id)
pub fn recipe_counts(entries: &[CalendarEntry]) -> Vec<RecipeCount> {
    let mut counts: HashMap<i64, RecipeCount> = HashMap::new();

    for entry in entries {
        counts
            .entry(entry.recipe_id)
            .or_insert_with(|| RecipeCount {
                recipe: entry.recipe.clone(),
                count: 0,
            })
            .count += 1;
    }

    let mut result: Vec<RecipeCount> = counts.into_values().collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then(a.recipe.id.cmp(&b.recipe.id)));
    result
}

/// Weekly counts for the most planned recipes
pub fn recipe_trends(entries: &[CalendarEntry]) -> RecipeTrends {
    let top_recipes: Vec<TopRecipe> = recipe_counts(entries)
        .into_iter()
        .take(TOP_RECIPE_LIMIT)
        .map(|rc| TopRecipe {
            id: rc.recipe.id,
            name: recipe_name_or_default(rc.recipe.name.as_deref()),
            total_count: rc.count,
        })
        .collect();

    if top_recipes.is_empty() {
        return RecipeTrends::default();
    }

    let mut weekly: BTreeMap<NaiveDate, HashMap<i64, usize>> = BTreeMap::new();
    for entry in entries {
        if !top_recipes.iter().any(|r| r.id == entry.recipe_id) {
            continue;
        }
        // Stored dates are validated on insert
        let Ok(date) = parse_date(&entry.date) else {
            continue;
        };
        *weekly
            .entry(week_start(date))
            .or_default()
            .entry(entry.recipe_id)
            .or_default() += 1;
    }

    let trends = weekly
        .into_iter()
        .map(|(week, counts)| WeeklyTrend {
            week: week.format("%Y-%m-%d").to_string(),
            counts: top_recipes
                .iter()
                .map(|r| RecipeWeekCount {
                    recipe_id: r.id,
                    name: r.name.clone(),
                    count: counts.get(&r.id).copied().unwrap_or(0),
                })
                .collect(),
        })
        .collect();

    RecipeTrends {
        top_recipes,
        trends,
    }
}
