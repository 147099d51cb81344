//! Shared nutrition data structures
//!
//! `NutrientVector` is the computed, always-defined form used across recipes,
//! aggregations and insights. `IngredientNutrients` is the raw per-100-unit
//! record stored for an ingredient, where any column may be missing.

use serde::{Deserialize, Serialize};

use crate::nutrition::defaults::nutrient_or_default;

/// Number of fields in a `NutrientVector`
pub const NUTRIENT_FIELD_COUNT: usize = 13;

/// Computed nutrient totals; every field is finite and non-negative
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientVector {
    pub calories_kcal: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub sugars_g: f64,
    pub agg_fats_g: f64,
    pub cholesterol_mg: f64,
    pub agg_minerals_mg: f64,
    pub vit_a_microg: f64,
    pub total_vit_b_mg: f64,
    pub vit_c_mg: f64,
    pub vit_d_microg: f64,
    pub vit_e_mg: f64,
    pub vit_k_microg: f64,
}

/// Nutrient values of an ingredient per 100 reference units, as stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientNutrients {
    pub calories_kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub sugars_g: Option<f64>,
    pub agg_fats_g: Option<f64>,
    pub cholesterol_mg: Option<f64>,
    pub agg_minerals_mg: Option<f64>,
    pub vit_a_microg: Option<f64>,
    pub agg_vit_b_mg: Option<f64>,
    pub vit_c_mg: Option<f64>,
    pub vit_d_microg: Option<f64>,
    pub vit_e_mg: Option<f64>,
    pub vit_k_microg: Option<f64>,
}

impl NutrientVector {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Resolve a stored ingredient record, applying the nutrient default policy
    pub fn from_ingredient(nutrients: &IngredientNutrients) -> Self {
        Self {
            calories_kcal: nutrient_or_default(nutrients.calories_kcal),
            protein_g: nutrient_or_default(nutrients.protein_g),
            carbs_g: nutrient_or_default(nutrients.carbs_g),
            sugars_g: nutrient_or_default(nutrients.sugars_g),
            agg_fats_g: nutrient_or_default(nutrients.agg_fats_g),
            cholesterol_mg: nutrient_or_default(nutrients.cholesterol_mg),
            agg_minerals_mg: nutrient_or_default(nutrients.agg_minerals_mg),
            vit_a_microg: nutrient_or_default(nutrients.vit_a_microg),
            total_vit_b_mg: nutrient_or_default(nutrients.agg_vit_b_mg),
            vit_c_mg: nutrient_or_default(nutrients.vit_c_mg),
            vit_d_microg: nutrient_or_default(nutrients.vit_d_microg),
            vit_e_mg: nutrient_or_default(nutrients.vit_e_mg),
            vit_k_microg: nutrient_or_default(nutrients.vit_k_microg),
        }
    }

    /// Field values in declaration order
    pub fn to_array(&self) -> [f64; NUTRIENT_FIELD_COUNT] {
        [
            self.calories_kcal,
            self.protein_g,
            self.carbs_g,
            self.sugars_g,
            self.agg_fats_g,
            self.cholesterol_mg,
            self.agg_minerals_mg,
            self.vit_a_microg,
            self.total_vit_b_mg,
            self.vit_c_mg,
            self.vit_d_microg,
            self.vit_e_mg,
            self.vit_k_microg,
        ]
    }

    fn from_array(values: [f64; NUTRIENT_FIELD_COUNT]) -> Self {
        Self {
            calories_kcal: values[0],
            protein_g: values[1],
            carbs_g: values[2],
            sugars_g: values[3],
            agg_fats_g: values[4],
            cholesterol_mg: values[5],
            agg_minerals_mg: values[6],
            vit_a_microg: values[7],
            total_vit_b_mg: values[8],
            vit_c_mg: values[9],
            vit_d_microg: values[10],
            vit_e_mg: values[11],
            vit_k_microg: values[12],
        }
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_array(self.to_array().map(f))
    }

    /// Scale every field by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        self.map(|v| v * multiplier)
    }

    /// Field-wise sum
    pub fn add(&self, other: &NutrientVector) -> Self {
        let mut values = self.to_array();
        for (value, rhs) in values.iter_mut().zip(other.to_array()) {
            *value += rhs;
        }
        Self::from_array(values)
    }

    /// Field-wise division by a count; zero counts as one
    pub fn divide(&self, count: usize) -> Self {
        let divisor = count.max(1) as f64;
        self.map(|v| v / divisor)
    }

    /// Round to one decimal place for display
    pub fn rounded(&self) -> Self {
        self.map(|v| (v * 10.0).round() / 10.0)
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl std::ops::Add for NutrientVector {
    type Output = NutrientVector;

    fn add(self, other: NutrientVector) -> NutrientVector {
        NutrientVector::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for NutrientVector {
    type Output = NutrientVector;

    fn mul(self, multiplier: f64) -> NutrientVector {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for NutrientVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientVector::zero(), |acc, n| acc + n)
    }
}

impl<'a> std::iter::Sum<&'a NutrientVector> for NutrientVector {
    fn sum<I: Iterator<Item = &'a NutrientVector>>(iter: I) -> Self {
        iter.fold(NutrientVector::zero(), |acc, n| acc + *n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ingredient_defaults_missing_fields() {
        let nutrients = IngredientNutrients {
            calories_kcal: Some(120.0),
            agg_vit_b_mg: Some(0.4),
            protein_g: Some(f64::NAN),
            ..Default::default()
        };
        let vector = NutrientVector::from_ingredient(&nutrients);
        assert_eq!(vector.calories_kcal, 120.0);
        assert_eq!(vector.total_vit_b_mg, 0.4);
        assert_eq!(vector.protein_g, 0.0);
        assert_eq!(vector.vit_k_microg, 0.0);
        assert!(vector.is_finite());
    }

    #[test]
    fn test_divide_by_zero_count_is_identity() {
        let vector = NutrientVector {
            calories_kcal: 300.0,
            ..Default::default()
        };
        assert_eq!(vector.divide(0), vector);
        assert_eq!(vector.divide(3).calories_kcal, 100.0);
    }

    #[test]
    fn test_sum_and_scale() {
        let a = NutrientVector {
            protein_g: 10.0,
            vit_c_mg: 2.0,
            ..Default::default()
        };
        let b = NutrientVector {
            protein_g: 5.0,
            ..Default::default()
        };
        let total: NutrientVector = [a, b].iter().sum();
        assert_eq!(total.protein_g, 15.0);
        assert_eq!(total.vit_c_mg, 2.0);
        assert_eq!((total * 2.0).protein_g, 30.0);
    }

    #[test]
    fn test_rounded() {
        let vector = NutrientVector {
            calories_kcal: 89.96,
            sugars_g: 1.04,
            ..Default::default()
        };
        let rounded = vector.rounded();
        assert_eq!(rounded.calories_kcal, 90.0);
        assert_eq!(rounded.sugars_g, 1.0);
    }
}
