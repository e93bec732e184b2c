//! Send a single plan request straight to Gemini, without retries.
//!
//! Run with: cargo run -p gemini-model --example generate_plan
//!
//! Requires GEMINI_API_KEY (a .env file is loaded if present).

use coach_core::{decode, CoachResponse, GenerationRequest, GenerativeModel, StructuredResponse};
use gemini_model::GeminiModel;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let model = GeminiModel::from_env()?;

    let request = GenerationRequest::text(
        "gemini-3-flash-preview",
        "Act as a health coach. Create a plan for a 30yo male, 70kg, 175cm, \
         maintaining weight at 0.5kg/week. Return JSON with dailyPlan and healthTips.",
        CoachResponse::schema(),
    );

    println!("Sending plan request to {}...", model.name());
    let text = model.generate(&request).await?;
    println!("Raw response:\n{}\n", text);

    let plan: CoachResponse = decode(&text)?;
    println!(
        "Calorie target: {} kcal, protein {}g, carbs {}g, fat {}g",
        plan.daily_plan.calorie_target,
        plan.daily_plan.protein_target,
        plan.daily_plan.carbs_target,
        plan.daily_plan.fat_target
    );
    println!("BMI: {}", plan.health_tips.bmi_analysis.category);

    Ok(())
}
