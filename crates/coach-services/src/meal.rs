//! Meal photo analysis.

use coach_core::{hash_prompt, CoachError, MealAnalysisResponse, PhotoImage};
use tracing::info;

use crate::client::RequestClient;

/// User-facing message when analysis fails without a message of its own.
pub const MEAL_ANALYSIS_FALLBACK: &str = "Meal analysis failed. Ensure your photo is clear.";

/// Fixed instruction sent with every photo.
pub const MEAL_PROMPT: &str = "Act as a clinical nutritionist expert. Identify food items in this photo.

For EACH item:
1. Name: Clear specific name.
2. Calories: Estimate.
3. Description: Technical breakdown.

Summary:
- totalCalories: sum.
- healthAlerts: 2-3 clinical notes.
- coachVerdict: expert summary.

STRICT REQUIREMENT: Return ONLY valid JSON.";

/// Identifies food items in a photo.
///
/// Calories come back unscaled; the portion multiplier is applied when the
/// meal is saved.
#[derive(Debug, Clone)]
pub struct MealAnalysisService {
    client: RequestClient,
    model_id: String,
}

impl MealAnalysisService {
    pub fn new(client: RequestClient, model_id: impl Into<String>) -> Self {
        let model_id = model_id.into();
        info!(
            "Meal analysis service ready (model: {}, prompt: {})",
            model_id,
            &hash_prompt(MEAL_PROMPT)[..12]
        );
        Self { client, model_id }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Analyze a photo.
    pub async fn analyze(&self, photo: &PhotoImage) -> Result<MealAnalysisResponse, CoachError> {
        let analysis: MealAnalysisResponse = self
            .client
            .execute(&self.model_id, MEAL_PROMPT, Some(photo.clone()))
            .await?;

        info!(
            "Meal analyzed: {} item(s), {} kcal",
            analysis.items.len(),
            analysis.total_calories
        );
        Ok(analysis)
    }
}
