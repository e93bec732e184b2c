//! Portion scaling for logged meals.

use crate::types::{MealAnalysisResponse, MealItemRecognition};

/// Smallest portion multiplier accepted at save time.
pub const PORTION_MIN: f64 = 0.1;

/// Largest portion multiplier accepted at save time.
pub const PORTION_MAX: f64 = 3.0;

/// Round to the nearest integer, with halves rounded up.
///
/// Halves round away from zero, which is upward for the non-negative
/// calorie values this is used on.
pub fn round_half_up(value: f64) -> f64 {
    value.round()
}

/// Scale a calorie estimate by a portion multiplier and round it.
pub fn scale_calories(calories: f64, portion: f64) -> f64 {
    round_half_up(calories * portion)
}

impl MealAnalysisResponse {
    /// Items with calories scaled by `portion`.
    pub fn scaled_items(&self, portion: f64) -> Vec<MealItemRecognition> {
        self.items
            .iter()
            .map(|item| MealItemRecognition {
                calories: scale_calories(item.calories, portion),
                ..item.clone()
            })
            .collect()
    }

    /// Total calories scaled by `portion`.
    pub fn scaled_total(&self, portion: f64) -> f64 {
        scale_calories(self.total_calories, portion)
    }
}
