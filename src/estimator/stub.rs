use rand::Rng;

use super::NutritionEstimate;

pub const SIMULATED_FEEDBACK: &str =
    "This is a simulated feedback. Configure your OpenAI API key for real data.";

/// Random but well-formed estimate used when no estimator key is configured.
pub fn simulated_estimate() -> NutritionEstimate {
    let mut rng = rand::thread_rng();
    NutritionEstimate {
        calories: rng.gen_range(100..=800) as f64,
        gram_carbs: rng.gen_range(10..=100) as f64,
        gram_proteins: rng.gen_range(5..=50) as f64,
        gram_fats: rng.gen_range(3..=30) as f64,
        feedback: SIMULATED_FEEDBACK.to_string(),
        quantity: rng.gen_range(1..=5) as f64,
        star_rating: Some(rng.gen_range(1..=5)),
    }
}
