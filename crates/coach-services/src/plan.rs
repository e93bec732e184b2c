//! Plan synthesis: a user profile in, a personalized plan out.

use coach_core::{hash_prompt, CoachError, CoachResponse, UserProfile};
use tracing::info;

use crate::client::RequestClient;

/// User-facing message when plan generation fails without a message of its own.
pub const PLAN_FALLBACK: &str = "Failed to generate plan. Please check your connection.";

const PLAN_PREAMBLE: &str = "Act as a health coach. Create a plan for:";
const PLAN_CLOSING: &str =
    "Return JSON with dailyPlan and healthTips (bmiAnalysis, targetAnalysis, paceAnalysis).";

/// Generates a [`CoachResponse`] for a profile.
#[derive(Debug, Clone)]
pub struct PlanService {
    client: RequestClient,
    model_id: String,
}

impl PlanService {
    pub fn new(client: RequestClient, model_id: impl Into<String>) -> Self {
        let model_id = model_id.into();
        let fingerprint = hash_prompt(&format!("{}\n{}", PLAN_PREAMBLE, PLAN_CLOSING));
        info!(
            "Plan service ready (model: {}, prompt: {})",
            model_id,
            &fingerprint[..12]
        );
        Self { client, model_id }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Build the instruction prompt for `profile`.
    ///
    /// Fails when the height is not a positive number, since the BMI embedded
    /// in the prompt would be meaningless.
    pub fn build_prompt(profile: &UserProfile) -> Result<String, CoachError> {
        if !(profile.height.is_finite() && profile.height > 0.0) {
            return Err(CoachError::RequestConstruction(format!(
                "height must be a positive number of centimetres, got {}",
                profile.height
            )));
        }

        Ok(format!(
            "{preamble}\n\
             - Goal: {goal}\n\
             - Stats: {age}yo, {gender}, {weight}kg, {height}cm, BMI: {bmi}\n\
             - Ethnicity: {ethnicity}, Diet: {diet}\n\
             - Activity: {activity}\n\
             - Target: {target}kg, Pace: {pace}kg/week\n\
             \n\
             {closing}",
            preamble = PLAN_PREAMBLE,
            goal = profile.goal,
            age = profile.age,
            gender = profile.gender,
            weight = profile.weight,
            height = profile.height,
            bmi = profile.bmi_display(),
            ethnicity = profile.ethnicity,
            diet = profile.dietary_preference,
            activity = profile.activity_level,
            target = profile.target_weight,
            pace = profile.pace,
            closing = PLAN_CLOSING,
        ))
    }

    /// Synthesize a plan. The result is returned as decoded, without any
    /// clamping or rounding.
    pub async fn generate(&self, profile: &UserProfile) -> Result<CoachResponse, CoachError> {
        let prompt = Self::build_prompt(profile)?;
        let plan: CoachResponse = self.client.execute(&self.model_id, &prompt, None).await?;

        info!(
            "Plan generated (calorie target: {}, score: {})",
            plan.daily_plan.calorie_target, plan.daily_plan.daily_nutrition_score
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::{Goal, Language};
    use mock_model::ScriptedModel;
    use std::sync::Arc;

    const PLAN: &str = r#"{
        "dailyPlan": {
            "dailyNutritionScore": 78,
            "estimatedCalorieExpenditure": 2300,
            "proteinTarget": 120,
            "carbsTarget": 220,
            "fatTarget": 65,
            "calorieTarget": 1900
        },
        "healthTips": {
            "bmiAnalysis": { "value": "24.2", "category": "Normal", "tip": "Stay active" },
            "targetAnalysis": { "tip": "Reachable in 10 weeks" },
            "paceAnalysis": { "tip": "Sustainable" }
        }
    }"#;

    fn profile() -> UserProfile {
        UserProfile {
            name: "Jeffrey".to_string(),
            goal: Goal::WeightLoss,
            age: 34,
            height: 180.0,
            weight: 78.5,
            target_weight: 72.0,
            pace: 0.5,
            language: Language::En,
            ..UserProfile::default()
        }
    }

    #[test]
    fn test_prompt_embeds_profile_and_bmi() {
        let prompt = PlanService::build_prompt(&profile()).unwrap();

        assert!(prompt.starts_with("Act as a health coach."));
        assert!(prompt.contains("- Goal: Weight Loss"));
        assert!(prompt.contains("34yo, Male, 78.5kg, 180cm, BMI: 24.2"));
        assert!(prompt.contains("Ethnicity: Prefer not to say, Diet: No Preference"));
        assert!(prompt.contains("- Activity: Moderately Active"));
        assert!(prompt.contains("Target: 72kg, Pace: 0.5kg/week"));
    }

    #[test]
    fn test_prompt_bmi_matches_profile() {
        for (height, weight) in [(150.0, 45.0), (175.0, 70.0), (192.0, 110.0)] {
            let profile = UserProfile {
                height,
                weight,
                ..UserProfile::default()
            };
            let prompt = PlanService::build_prompt(&profile).unwrap();
            assert!(prompt.contains(&format!("BMI: {}", profile.bmi_display())));
        }
    }

    #[test]
    fn test_zero_height_rejected() {
        let profile = UserProfile {
            height: 0.0,
            ..UserProfile::default()
        };
        let err = PlanService::build_prompt(&profile).unwrap_err();
        assert!(matches!(err, CoachError::RequestConstruction(_)));
    }

    #[tokio::test]
    async fn test_generate_returns_plan_verbatim() {
        let model = Arc::new(ScriptedModel::new().then_ok(PLAN));
        let service = PlanService::new(RequestClient::new(model.clone()), "plan-model");

        let plan = service.generate(&profile()).await.unwrap();

        assert_eq!(plan.daily_plan.calorie_target, 1900.0);
        assert_eq!(plan.health_tips.bmi_analysis.value, "24.2");
        let sent = &model.requests()[0];
        assert_eq!(sent.model, "plan-model");
        assert!(sent.image.is_none());
        assert!(sent.prompt.contains("BMI: 24.2"));
    }

    #[tokio::test]
    async fn test_missing_nutrition_score_is_schema_violation() {
        let broken = PLAN.replace("\"dailyNutritionScore\": 78,", "");
        let model = Arc::new(ScriptedModel::new().then_ok(broken));
        let service = PlanService::new(RequestClient::new(model), "plan-model");

        let err = service.generate(&profile()).await.unwrap_err();
        assert!(err.is_schema_violation());
        assert_eq!(err.user_message(PLAN_FALLBACK), err.to_string());
    }

    #[tokio::test]
    async fn test_invalid_profile_makes_no_call() {
        let model = Arc::new(ScriptedModel::new().then_ok(PLAN));
        let service = PlanService::new(RequestClient::new(model.clone()), "plan-model");
        let profile = UserProfile {
            height: -1.0,
            ..profile()
        };

        assert!(service.generate(&profile).await.is_err());
        assert_eq!(model.call_count(), 0);
    }
}
