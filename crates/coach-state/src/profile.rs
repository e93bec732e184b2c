//! Profile field changes.

use coach_core::{ActivityLevel, Ethnicity, Gender, Goal, Language, UserProfile};

use crate::error::{Result, StateError};

/// A single profile field assignment.
///
/// Measurements must be finite. Beyond that, values are applied as given;
/// range checks such as the pace convention belong to whoever collects the
/// input.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileChange {
    Name(String),
    Goal(Goal),
    Gender(Gender),
    Age(u32),
    Height(f64),
    Weight(f64),
    Ethnicity(Ethnicity),
    DietaryPreference(String),
    ActivityLevel(ActivityLevel),
    TargetWeight(f64),
    Pace(f64),
    Language(Language),
}

impl ProfileChange {
    /// Field names accepted by [`ProfileChange::parse`].
    pub const FIELDS: [&'static str; 12] = [
        "name",
        "goal",
        "gender",
        "age",
        "height",
        "weight",
        "ethnicity",
        "diet",
        "activity",
        "target",
        "pace",
        "language",
    ];

    /// Parse a field name and value from user input.
    ///
    /// Enumerated fields accept their display strings, case-insensitively.
    pub fn parse(field: &str, value: &str) -> Result<Self> {
        let value = value.trim();
        let change = match field.to_lowercase().as_str() {
            "name" => ProfileChange::Name(value.to_string()),
            "goal" => ProfileChange::Goal(choose(field, value, &Goal::ALL, Goal::as_str)?),
            "gender" => ProfileChange::Gender(choose(field, value, &Gender::ALL, Gender::as_str)?),
            "age" => ProfileChange::Age(number(field, value)?),
            "height" => ProfileChange::Height(measurement(field, value)?),
            "weight" => ProfileChange::Weight(measurement(field, value)?),
            "ethnicity" => ProfileChange::Ethnicity(choose(
                field,
                value,
                &Ethnicity::ALL,
                Ethnicity::as_str,
            )?),
            "diet" | "dietary_preference" => ProfileChange::DietaryPreference(value.to_string()),
            "activity" | "activity_level" => ProfileChange::ActivityLevel(choose(
                field,
                value,
                &ActivityLevel::ALL,
                ActivityLevel::as_str,
            )?),
            "target" | "target_weight" => ProfileChange::TargetWeight(measurement(field, value)?),
            "pace" => ProfileChange::Pace(measurement(field, value)?),
            "language" | "lang" => {
                ProfileChange::Language(choose(field, value, &Language::ALL, Language::as_str)?)
            }
            _ => return Err(StateError::UnknownField(field.to_string())),
        };
        Ok(change)
    }

    /// Check that a measurement is a finite number.
    pub fn validate(&self) -> Result<()> {
        let (field, value) = match self {
            ProfileChange::Height(v) => ("height", *v),
            ProfileChange::Weight(v) => ("weight", *v),
            ProfileChange::TargetWeight(v) => ("target", *v),
            ProfileChange::Pace(v) => ("pace", *v),
            _ => return Ok(()),
        };
        finite(field, value).map(|_| ())
    }

    /// Apply the change to `profile`.
    pub fn apply(self, profile: &mut UserProfile) {
        match self {
            ProfileChange::Name(v) => profile.name = v,
            ProfileChange::Goal(v) => profile.goal = v,
            ProfileChange::Gender(v) => profile.gender = v,
            ProfileChange::Age(v) => profile.age = v,
            ProfileChange::Height(v) => profile.height = v,
            ProfileChange::Weight(v) => profile.weight = v,
            ProfileChange::Ethnicity(v) => profile.ethnicity = v,
            ProfileChange::DietaryPreference(v) => profile.dietary_preference = v,
            ProfileChange::ActivityLevel(v) => profile.activity_level = v,
            ProfileChange::TargetWeight(v) => profile.target_weight = v,
            ProfileChange::Pace(v) => profile.pace = v,
            ProfileChange::Language(v) => profile.language = v,
        }
    }
}

fn choose<T: Copy>(
    field: &str,
    value: &str,
    options: &[T],
    label: fn(&T) -> &'static str,
) -> Result<T> {
    options
        .iter()
        .find(|option| label(option).eq_ignore_ascii_case(value))
        .copied()
        .ok_or_else(|| {
            let allowed: Vec<&str> = options.iter().map(label).collect();
            StateError::invalid(format!(
                "invalid {} `{}` (expected one of: {})",
                field,
                value,
                allowed.join(", ")
            ))
        })
}

fn number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| StateError::invalid(format!("invalid {} `{}`: not a number", field, value)))
}

fn measurement(field: &str, value: &str) -> Result<f64> {
    finite(field, number(field, value)?)
}

fn finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StateError::invalid(format!(
            "invalid {} `{}`: must be a finite number",
            field, value
        )))
    }
}
