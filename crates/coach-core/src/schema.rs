//! Response schemas and the decode step.
//!
//! A [`Schema`] serves two purposes: it is sent with the request so the
//! model produces conforming JSON, and it is checked against the returned
//! text before the typed value is built. A response that parses but lacks
//! a required field is a [`CoachError::SchemaViolation`], never a partially
//! filled value.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::error::{CoachError, Result};
use crate::types::{CoachResponse, MealAnalysisResponse};

/// Shape of a structured response.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String,
    Number,
    Array(Box<Schema>),
    Object(Vec<Field>),
}

/// A named property of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub schema: Schema,
    pub required: bool,
}

impl Field {
    /// A property that must be present and non-null.
    pub fn required(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            schema,
            required: true,
        }
    }

    /// A property that may be absent or null.
    pub fn optional(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            schema,
            required: false,
        }
    }
}

impl Schema {
    pub fn string() -> Self {
        Schema::String
    }

    pub fn number() -> Self {
        Schema::Number
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array(Box::new(items))
    }

    pub fn object(fields: Vec<Field>) -> Self {
        Schema::Object(fields)
    }

    /// Names of the required properties of an object schema.
    pub fn required_fields(&self) -> Vec<&'static str> {
        match self {
            Schema::Object(fields) => fields
                .iter()
                .filter(|f| f.required)
                .map(|f| f.name)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Render as the OpenAPI-style schema object the Gemini API accepts
    /// in `generationConfig.responseSchema`.
    pub fn to_json(&self) -> Value {
        match self {
            Schema::String => json!({ "type": "STRING" }),
            Schema::Number => json!({ "type": "NUMBER" }),
            Schema::Array(items) => json!({ "type": "ARRAY", "items": items.to_json() }),
            Schema::Object(fields) => {
                let mut properties = Map::new();
                for field in fields {
                    properties.insert(field.name.to_string(), field.schema.to_json());
                }
                json!({
                    "type": "OBJECT",
                    "properties": properties,
                    "required": self.required_fields(),
                })
            }
        }
    }

    /// Check a parsed value against this schema.
    pub fn validate(&self, value: &Value) -> Result<()> {
        self.validate_at(value, "response")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<()> {
        match self {
            Schema::String if value.is_string() => Ok(()),
            Schema::String => Err(type_mismatch(path, "string", value)),
            Schema::Number if value.is_number() => Ok(()),
            Schema::Number => Err(type_mismatch(path, "number", value)),
            Schema::Array(items) => {
                let elements = value
                    .as_array()
                    .ok_or_else(|| type_mismatch(path, "array", value))?;
                for (index, element) in elements.iter().enumerate() {
                    items.validate_at(element, &format!("{}[{}]", path, index))?;
                }
                Ok(())
            }
            Schema::Object(fields) => {
                let object = value
                    .as_object()
                    .ok_or_else(|| type_mismatch(path, "object", value))?;
                for field in fields {
                    let field_path = format!("{}.{}", path, field.name);
                    match object.get(field.name) {
                        Some(Value::Null) | None if field.required => {
                            return Err(CoachError::schema(format!(
                                "missing required field `{}`",
                                field_path
                            )));
                        }
                        Some(Value::Null) | None => {}
                        Some(inner) => field.schema.validate_at(inner, &field_path)?,
                    }
                }
                Ok(())
            }
        }
    }
}

fn type_mismatch(path: &str, expected: &str, value: &Value) -> CoachError {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    CoachError::schema(format!("`{}` should be {}, found {}", path, expected, found))
}

/// A typed response with a declared schema.
pub trait StructuredResponse: DeserializeOwned {
    /// The schema requested from the model and enforced on decode.
    fn schema() -> Schema;
}

/// Decode response text into a typed value.
///
/// The text is trimmed, parsed as JSON, checked against `T::schema()`,
/// then deserialized.
pub fn decode<T: StructuredResponse>(text: &str) -> Result<T> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| CoachError::schema(format!("response is not valid JSON: {}", e)))?;

    T::schema().validate(&value)?;

    serde_json::from_value(value).map_err(|e| CoachError::schema(e.to_string()))
}

impl StructuredResponse for CoachResponse {
    fn schema() -> Schema {
        let tip = || Schema::object(vec![Field::required("tip", Schema::string())]);

        Schema::object(vec![
            Field::required(
                "dailyPlan",
                Schema::object(vec![
                    Field::required("dailyNutritionScore", Schema::number()),
                    Field::required("estimatedCalorieExpenditure", Schema::number()),
                    Field::required("proteinTarget", Schema::number()),
                    Field::required("carbsTarget", Schema::number()),
                    Field::required("fatTarget", Schema::number()),
                    Field::required("calorieTarget", Schema::number()),
                ]),
            ),
            Field::required(
                "healthTips",
                Schema::object(vec![
                    Field::required(
                        "bmiAnalysis",
                        Schema::object(vec![
                            Field::required("value", Schema::string()),
                            Field::required("category", Schema::string()),
                            Field::required("tip", Schema::string()),
                        ]),
                    ),
                    Field::required("targetAnalysis", tip()),
                    Field::required("paceAnalysis", tip()),
                ]),
            ),
        ])
    }
}

impl StructuredResponse for MealAnalysisResponse {
    fn schema() -> Schema {
        Schema::object(vec![
            Field::required(
                "items",
                Schema::array(Schema::object(vec![
                    Field::required("name", Schema::string()),
                    Field::required("calories", Schema::number()),
                    Field::optional("description", Schema::string()),
                ])),
            ),
            Field::required("totalCalories", Schema::number()),
            Field::required("healthAlerts", Schema::array(Schema::string())),
            Field::required("coachVerdict", Schema::string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
        {
            "dailyPlan": {
                "dailyNutritionScore": 82,
                "estimatedCalorieExpenditure": 2450,
                "proteinTarget": 140,
                "carbsTarget": 250,
                "fatTarget": 70,
                "calorieTarget": 2100
            },
            "healthTips": {
                "bmiAnalysis": { "value": "22.9", "category": "Normal", "tip": "Keep it up" },
                "targetAnalysis": { "tip": "Target is realistic" },
                "paceAnalysis": { "tip": "0.5kg/week is sustainable" }
            }
        }
    "#;

    const MEAL: &str = r#"{
        "items": [
            { "name": "Rice", "calories": 200, "description": "Steamed jasmine rice" },
            { "name": "Egg", "calories": 78 }
        ],
        "totalCalories": 278,
        "healthAlerts": ["High glycemic load", "Low fibre"],
        "coachVerdict": "Add vegetables."
    }"#;

    #[test]
    fn test_decode_plan() {
        let plan: CoachResponse = decode(PLAN).unwrap();
        assert_eq!(plan.daily_plan.daily_nutrition_score, 82.0);
        assert_eq!(plan.daily_plan.calorie_target, 2100.0);
        assert_eq!(plan.health_tips.bmi_analysis.category, "Normal");
        assert_eq!(plan.health_tips.pace_analysis.tip, "0.5kg/week is sustainable");
    }

    #[test]
    fn test_decode_meal_with_optional_description() {
        let meal: MealAnalysisResponse = decode(MEAL).unwrap();
        assert_eq!(meal.items.len(), 2);
        assert_eq!(
            meal.items[0].description.as_deref(),
            Some("Steamed jasmine rice")
        );
        assert!(meal.items[1].description.is_none());
        assert_eq!(meal.total_calories, 278.0);
    }

    #[test]
    fn test_missing_coach_verdict() {
        let mut value: Value = serde_json::from_str(MEAL).unwrap();
        value.as_object_mut().unwrap().remove("coachVerdict");

        let err = decode::<MealAnalysisResponse>(&value.to_string()).unwrap_err();
        assert!(err.is_schema_violation());
        assert!(err.to_string().contains("response.coachVerdict"));
    }

    #[test]
    fn test_missing_daily_nutrition_score() {
        let mut value: Value = serde_json::from_str(PLAN).unwrap();
        value["dailyPlan"]
            .as_object_mut()
            .unwrap()
            .remove("dailyNutritionScore");

        let err = decode::<CoachResponse>(&value.to_string()).unwrap_err();
        assert!(err.is_schema_violation());
        assert!(err
            .to_string()
            .contains("response.dailyPlan.dailyNutritionScore"));
    }

    #[test]
    fn test_missing_item_calories() {
        let text = r#"{"items":[{"name":"Rice"}],"totalCalories":1,"healthAlerts":[],"coachVerdict":"ok"}"#;
        let err = decode::<MealAnalysisResponse>(text).unwrap_err();
        assert!(err.to_string().contains("response.items[0].calories"));
    }

    #[test]
    fn test_null_required_field_is_missing() {
        let text = r#"{"items":[],"totalCalories":null,"healthAlerts":[],"coachVerdict":"ok"}"#;
        let err = decode::<MealAnalysisResponse>(text).unwrap_err();
        assert!(err.to_string().contains("missing required field"));
    }

    #[test]
    fn test_wrong_type() {
        let text = r#"{"items":[],"totalCalories":"lots","healthAlerts":[],"coachVerdict":"ok"}"#;
        let err = decode::<MealAnalysisResponse>(text).unwrap_err();
        assert!(err.is_schema_violation());
        assert!(err.to_string().contains("should be number, found string"));
    }

    #[test]
    fn test_malformed_text() {
        let err = decode::<MealAnalysisResponse>("Sure! Here is your analysis").unwrap_err();
        assert!(err.is_schema_violation());
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let padded = format!("\n\n  {}  \n", MEAL);
        assert!(decode::<MealAnalysisResponse>(&padded).is_ok());
    }

    #[test]
    fn test_schema_json() {
        let json = MealAnalysisResponse::schema().to_json();
        assert_eq!(json["type"], "OBJECT");
        assert_eq!(json["properties"]["items"]["type"], "ARRAY");
        assert_eq!(
            json["properties"]["items"]["items"]["required"],
            serde_json::json!(["name", "calories"])
        );
        assert_eq!(
            json["required"],
            serde_json::json!(["items", "totalCalories", "healthAlerts", "coachVerdict"])
        );
    }
}
