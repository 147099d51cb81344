//! Default policy for missing source data
//!
//! Every fallback applied to nullable catalog columns lives here.

/// Value used for a nutrient column that is NULL (or not a usable number)
pub const NUTRIENT_DEFAULT: f64 = 0.0;

/// Relative weight assumed when an association has none: the full reference amount
pub const RELATIVE_WEIGHT_DEFAULT: f64 = 100.0;

/// Relative weights are expressed in parts per this many reference units
pub const RELATIVE_WEIGHT_BASE: f64 = 100.0;

/// Display name for recipes stored without one
pub const UNKNOWN_RECIPE_NAME: &str = "Unknown";

/// Resolve a stored nutrient value; NULL, NaN, infinite and negative values become the default
pub fn nutrient_or_default(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => NUTRIENT_DEFAULT,
    }
}

/// Scaling ratio for an ingredient association: `(weight ?? 100) / 100`
///
/// A non-finite weight is treated as missing; a negative one contributes nothing.
pub fn weight_ratio(relative_weight: Option<f64>) -> f64 {
    let weight = match relative_weight {
        Some(w) if w.is_finite() => w.max(0.0),
        _ => RELATIVE_WEIGHT_DEFAULT,
    };
    weight / RELATIVE_WEIGHT_BASE
}

/// Display name for a recipe, falling back when the stored name is missing or blank
pub fn recipe_name_or_default(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => UNKNOWN_RECIPE_NAME.to_string(),
    }
}
