//! Plain-text rendering of coach records.

use std::fmt::Write;

use coach_core::{CoachResponse, FoodItem, LoggedMeal, MealAnalysisResponse, UserProfile};

pub fn profile(profile: &UserProfile) -> String {
    let mut out = String::new();
    let name = if profile.name.is_empty() {
        "(not set)"
    } else {
        profile.name.as_str()
    };
    let _ = writeln!(out, "Name:        {}", name);
    let _ = writeln!(out, "Goal:        {}", profile.goal);
    let _ = writeln!(out, "Gender:      {}", profile.gender);
    let _ = writeln!(out, "Age:         {}", profile.age);
    let _ = writeln!(out, "Height:      {} cm", profile.height);
    let _ = writeln!(
        out,
        "Weight:      {} kg (BMI {})",
        profile.weight,
        profile.bmi_display()
    );
    let _ = writeln!(out, "Ethnicity:   {}", profile.ethnicity);
    let _ = writeln!(out, "Diet:        {}", profile.dietary_preference);
    let _ = writeln!(out, "Activity:    {}", profile.activity_level);
    let _ = writeln!(
        out,
        "Target:      {} kg at {} kg/week",
        profile.target_weight, profile.pace
    );
    let _ = writeln!(out, "Language:    {}", profile.language);
    let _ = write!(
        out,
        "Streak:      {} | Points: {} | Bookmarks: {}",
        profile.streak,
        profile.points,
        profile.bookmarks.len()
    );
    out
}

pub fn plan(plan: &CoachResponse) -> String {
    let daily = &plan.daily_plan;
    let tips = &plan.health_tips;
    let mut out = String::new();
    let _ = writeln!(out, "Nutrition score:  {}/100", daily.daily_nutrition_score);
    let _ = writeln!(
        out,
        "Calories:         {} kcal (burn ~{} kcal)",
        daily.calorie_target, daily.estimated_calorie_expenditure
    );
    let _ = writeln!(
        out,
        "Macros:           {} g protein, {} g carbs, {} g fat",
        daily.protein_target, daily.carbs_target, daily.fat_target
    );
    let _ = writeln!(
        out,
        "BMI {} ({}): {}",
        tips.bmi_analysis.value, tips.bmi_analysis.category, tips.bmi_analysis.tip
    );
    let _ = writeln!(out, "Target: {}", tips.target_analysis.tip);
    let _ = write!(out, "Pace:   {}", tips.pace_analysis.tip);
    out
}

/// An analysis previewed at `portion`.
pub fn analysis(analysis: &MealAnalysisResponse, portion: f64) -> String {
    let mut out = String::new();
    for item in analysis.scaled_items(portion) {
        let _ = write!(out, "- {}: {} kcal", item.name, item.calories);
        if let Some(description) = &item.description {
            let _ = write!(out, " ({})", description);
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "Total: {} kcal at portion {}x",
        analysis.scaled_total(portion),
        portion
    );
    for alert in &analysis.health_alerts {
        let _ = writeln!(out, "! {}", alert);
    }
    let _ = write!(out, "Coach: {}", analysis.coach_verdict);
    out
}

pub fn meal(meal: &LoggedMeal) -> String {
    let names: Vec<&str> = meal.items.iter().map(|i| i.name.as_str()).collect();
    format!(
        "{}  {:>6} kcal  x{}  {}  [{}]",
        meal.timestamp.format("%Y-%m-%d %H:%M"),
        meal.total_calories,
        meal.portion,
        names.join(", "),
        meal.id
    )
}

pub fn bookmark(item: &FoodItem) -> String {
    format!("{}  {} ({} kcal)", item.id, item.name, item.calories)
}
