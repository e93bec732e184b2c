//! Data model shared by the services, the reconciler, and the store.
//!
//! Field names serialize in camelCase and enum values as their display
//! strings, so persisted records keep the layout the client has always used.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Dietary preferences offered during onboarding.
pub const DIETARY_PREFERENCES: &[&str] = &[
    "No Preference",
    "Vegetarian",
    "Vegan",
    "Pescatarian",
    "Keto",
    "Paleo",
];

/// Height of a new profile, in centimetres.
pub const DEFAULT_HEIGHT_CM: f64 = 175.0;

/// Weight and target weight of a new profile, in kilograms.
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

/// Weekly pace of a new profile, in kilograms.
pub const DEFAULT_PACE: f64 = 0.5;

/// Primary goal of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Goal {
    #[serde(rename = "Weight Loss")]
    WeightLoss,
    #[serde(rename = "Weight Gain")]
    WeightGain,
    #[default]
    #[serde(rename = "Maintain Weight")]
    Maintain,
}

impl Goal {
    /// All goals, in onboarding order.
    pub const ALL: [Goal; 3] = [Goal::WeightLoss, Goal::WeightGain, Goal::Maintain];

    /// Display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::WeightLoss => "Weight Loss",
            Goal::WeightGain => "Weight Gain",
            Goal::Maintain => "Maintain Weight",
        }
    }
}

/// Birth gender, used for metabolic estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// Self-reported ethnicity. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ethnicity {
    Asian,
    Black,
    Hispanic,
    White,
    #[serde(rename = "Pacific Islander")]
    PacificIslander,
    #[serde(rename = "Middle Eastern")]
    MiddleEastern,
    #[serde(rename = "Native American")]
    NativeAmerican,
    Mixed,
    #[default]
    #[serde(rename = "Prefer not to say")]
    PreferNotToSay,
}

impl Ethnicity {
    pub const ALL: [Ethnicity; 9] = [
        Ethnicity::Asian,
        Ethnicity::Black,
        Ethnicity::Hispanic,
        Ethnicity::White,
        Ethnicity::PacificIslander,
        Ethnicity::MiddleEastern,
        Ethnicity::NativeAmerican,
        Ethnicity::Mixed,
        Ethnicity::PreferNotToSay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ethnicity::Asian => "Asian",
            Ethnicity::Black => "Black",
            Ethnicity::Hispanic => "Hispanic",
            Ethnicity::White => "White",
            Ethnicity::PacificIslander => "Pacific Islander",
            Ethnicity::MiddleEastern => "Middle Eastern",
            Ethnicity::NativeAmerican => "Native American",
            Ethnicity::Mixed => "Mixed",
            Ethnicity::PreferNotToSay => "Prefer not to say",
        }
    }
}

/// Typical daily activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivityLevel {
    Sedentary,
    #[serde(rename = "Lightly Active")]
    LightlyActive,
    #[default]
    #[serde(rename = "Moderately Active")]
    ModeratelyActive,
    #[serde(rename = "Highly Active")]
    HighlyActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 4] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::HighlyActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly Active",
            ActivityLevel::ModeratelyActive => "Moderately Active",
            ActivityLevel::HighlyActive => "Highly Active",
        }
    }
}

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Zh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

macro_rules! display_via_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_via_as_str!(Goal, Gender, Ethnicity, ActivityLevel, Language);

/// A bookmarked food. Bookmarks are unique by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub score: f64,
}

/// The single user profile of this installation.
///
/// Missing fields in a stored record fall back to the defaults. So do
/// measurements stored as `null`, which is how JSON records a non-finite
/// number; the rest of the record is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub goal: Goal,
    pub gender: Gender,
    /// Age in years.
    pub age: u32,
    /// Height in centimetres.
    #[serde(deserialize_with = "height_or_default")]
    pub height: f64,
    /// Weight in kilograms.
    #[serde(deserialize_with = "weight_or_default")]
    pub weight: f64,
    pub ethnicity: Ethnicity,
    pub dietary_preference: String,
    pub activity_level: ActivityLevel,
    /// Target weight in kilograms.
    #[serde(deserialize_with = "weight_or_default")]
    pub target_weight: f64,
    /// Desired change in kg per week, 0.1 to 1.5 by convention of the caller.
    #[serde(deserialize_with = "pace_or_default")]
    pub pace: f64,
    pub language: Language,
    pub streak: u32,
    pub last_active: DateTime<Utc>,
    pub points: u32,
    pub bookmarks: Vec<FoodItem>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            goal: Goal::Maintain,
            gender: Gender::Male,
            age: 30,
            height: DEFAULT_HEIGHT_CM,
            weight: DEFAULT_WEIGHT_KG,
            ethnicity: Ethnicity::PreferNotToSay,
            dietary_preference: DIETARY_PREFERENCES[0].to_string(),
            activity_level: ActivityLevel::ModeratelyActive,
            target_weight: DEFAULT_WEIGHT_KG,
            pace: DEFAULT_PACE,
            language: Language::En,
            streak: 0,
            last_active: Utc::now(),
            points: 0,
            bookmarks: Vec::new(),
        }
    }
}

fn finite_or<'de, D>(deserializer: D, fallback: f64) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).unwrap_or(fallback))
}

fn height_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    finite_or(deserializer, DEFAULT_HEIGHT_CM)
}

fn weight_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    finite_or(deserializer, DEFAULT_WEIGHT_KG)
}

fn pace_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    finite_or(deserializer, DEFAULT_PACE)
}

impl UserProfile {
    /// Body mass index: weight (kg) / height (m)^2.
    pub fn bmi(&self) -> f64 {
        let height_m = self.height / 100.0;
        self.weight / (height_m * height_m)
    }

    /// BMI rounded to one decimal place, as embedded in plan requests.
    pub fn bmi_display(&self) -> String {
        format!("{:.1}", (self.bmi() * 10.0).round() / 10.0)
    }

    /// Whether a bookmark with this name exists.
    pub fn is_bookmarked(&self, name: &str) -> bool {
        self.bookmarks.iter().any(|b| b.name == name)
    }
}

/// One food identified in a photo.
///
/// `calories` is unscaled in an analysis result and portion-scaled once the
/// item is part of a [`LoggedMeal`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItemRecognition {
    pub name: String,
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A confirmed meal in the journal. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedMeal {
    pub id: String,
    /// Capture time, serialized as an ISO-8601 string.
    pub timestamp: DateTime<Utc>,
    pub items: Vec<MealItemRecognition>,
    pub total_calories: f64,
    pub health_alerts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_verdict: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Multiplier applied to every calorie value at save time.
    pub portion: f64,
}

/// Daily targets of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    /// 0 to 100.
    pub daily_nutrition_score: f64,
    pub estimated_calorie_expenditure: f64,
    pub protein_target: f64,
    pub carbs_target: f64,
    pub fat_target: f64,
    pub calorie_target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiAnalysis {
    pub value: String,
    pub category: String,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipAnalysis {
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthTips {
    pub bmi_analysis: BmiAnalysis,
    pub target_analysis: TipAnalysis,
    pub pace_analysis: TipAnalysis,
}

/// A personalized plan. Replaced wholesale on regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachResponse {
    pub daily_plan: DailyPlan,
    pub health_tips: HealthTips,
}

/// Result of analyzing a meal photo. Never persisted itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAnalysisResponse {
    pub items: Vec<MealItemRecognition>,
    pub total_calories: f64,
    pub health_alerts: Vec<String>,
    pub coach_verdict: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = UserProfile::default();
        assert_eq!(profile.goal, Goal::Maintain);
        assert_eq!(profile.age, 30);
        assert_eq!(profile.height, 175.0);
        assert_eq!(profile.weight, 70.0);
        assert_eq!(profile.dietary_preference, "No Preference");
        assert_eq!(profile.pace, 0.5);
        assert_eq!(profile.streak, 0);
        assert_eq!(profile.points, 0);
        assert!(profile.bookmarks.is_empty());
    }

    #[test]
    fn test_bmi() {
        let profile = UserProfile::default();
        assert!((profile.bmi() - 22.857).abs() < 0.001);
        assert_eq!(profile.bmi_display(), "22.9");

        let profile = UserProfile {
            height: 160.0,
            weight: 60.0,
            ..UserProfile::default()
        };
        assert_eq!(profile.bmi_display(), "23.4");
    }

    #[test]
    fn test_profile_serializes_display_strings() {
        let profile = UserProfile {
            goal: Goal::WeightLoss,
            activity_level: ActivityLevel::LightlyActive,
            ..UserProfile::default()
        };
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["goal"], "Weight Loss");
        assert_eq!(json["activityLevel"], "Lightly Active");
        assert_eq!(json["ethnicity"], "Prefer not to say");
        assert_eq!(json["language"], "en");
        assert!(json.get("targetWeight").is_some());
        assert!(json.get("lastActive").is_some());
    }

    #[test]
    fn test_profile_missing_fields_use_defaults() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"name": "Jeffrey", "streak": 4}"#).unwrap();
        assert_eq!(profile.name, "Jeffrey");
        assert_eq!(profile.streak, 4);
        assert_eq!(profile.height, 175.0);
    }

    #[test]
    fn test_profile_null_measurements_use_defaults() {
        let json = r#"{
            "height": null,
            "weight": null,
            "targetWeight": 65.5,
            "pace": null,
            "streak": 7,
            "points": 70,
            "bookmarks": [{"id": "b1", "name": "Apple", "calories": 95,
                           "protein": 0, "carbs": 0, "fats": 0, "score": 0}]
        }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.height, DEFAULT_HEIGHT_CM);
        assert_eq!(profile.weight, DEFAULT_WEIGHT_KG);
        assert_eq!(profile.target_weight, 65.5);
        assert_eq!(profile.pace, DEFAULT_PACE);
        assert_eq!(profile.streak, 7);
        assert_eq!(profile.points, 70);
        assert_eq!(profile.bookmarks[0].name, "Apple");

        // A non-finite value written out comes back as the default
        let written = serde_json::to_string(&UserProfile {
            weight: f64::NAN,
            ..profile
        })
        .unwrap();
        let reread: UserProfile = serde_json::from_str(&written).unwrap();
        assert_eq!(reread.weight, DEFAULT_WEIGHT_KG);
        assert_eq!(reread.streak, 7);
    }

    #[test]
    fn test_logged_meal_omits_empty_optionals() {
        let meal = LoggedMeal {
            id: "m1".to_string(),
            timestamp: Utc::now(),
            items: vec![MealItemRecognition {
                name: "Rice".to_string(),
                calories: 300.0,
                description: None,
            }],
            total_calories: 300.0,
            health_alerts: vec![],
            coach_verdict: None,
            photo_url: None,
            portion: 1.5,
        };
        let json = serde_json::to_value(&meal).unwrap();

        assert_eq!(json["totalCalories"], 300.0);
        assert!(json.get("photoUrl").is_none());
        assert!(json.get("coachVerdict").is_none());
        assert!(json["items"][0].get("description").is_none());
    }

    #[test]
    fn test_is_bookmarked() {
        let mut profile = UserProfile::default();
        profile.bookmarks.push(FoodItem {
            id: "b1".to_string(),
            name: "Rice".to_string(),
            calories: 200.0,
            protein: 0.0,
            carbs: 0.0,
            fats: 0.0,
            score: 0.0,
        });
        assert!(profile.is_bookmarked("Rice"));
        assert!(!profile.is_bookmarked("rice"));
    }
}
