//! Wire types and response parsing for the generative estimation API.
//!
//! The HTTP client lives in the CLI crate; this module owns the request and
//! response shapes plus the defensive parsing: the model is asked for bare
//! JSON but routinely wraps it in markdown fencing, and a malformed reply
//! degrades to a low-confidence placeholder instead of failing the log flow.

use serde::{Deserialize, Serialize};

use crate::models::Macros;

// --- Request ---

#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded JPEG bytes.
    pub data: String,
}

/// Capability flag requesting web-grounded search for nutrition lookups.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub google_search: serde_json::Value,
}

impl Tool {
    #[must_use]
    pub fn web_search() -> Self {
        Self {
            google_search: serde_json::json!({}),
        }
    }
}

// --- Response ---

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

// --- Estimates ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodEstimate {
    pub food_name: String,
    pub calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macros: Option<Macros>,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseEstimate {
    pub calories: f64,
}

// --- Prompts ---

#[must_use]
pub fn food_prompt(description: Option<&str>, has_image: bool) -> String {
    let mut prompt = String::from(
        "Estimate the nutrition of the described food. Respond with only a JSON object, \
         no prose, with keys: food_name (string), calories (number, kcal for the whole \
         serving), protein (number, g), carbs (number, g), fat (number, g), \
         serving_size (string), confidence (\"high\"|\"medium\"|\"low\").",
    );
    if has_image {
        prompt.push_str(" A photo of the food is attached.");
    }
    if let Some(desc) = description {
        prompt.push_str("\nDescription: ");
        prompt.push_str(desc);
    }
    prompt
}

#[must_use]
pub fn exercise_prompt(activity: &str, duration_minutes: f64) -> String {
    format!(
        "Estimate calories burned by an average adult doing the following activity. \
         Respond with only a JSON object, no prose, with key: calories (number, kcal).\n\
         Activity: {activity}\nDuration: {duration_minutes} minutes"
    )
}

// --- Parsing ---

/// Strip a markdown code fence (``` or ```json) wrapping the payload.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Debug, Deserialize)]
struct RawFoodEstimate {
    food_name: Option<String>,
    calories: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    serving_size: Option<String>,
    confidence: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawExerciseEstimate {
    calories: Option<f64>,
}

fn parse_confidence(raw: Option<&str>) -> Confidence {
    match raw.map(str::to_lowercase).as_deref() {
        Some("high") => Confidence::High,
        Some("low") => Confidence::Low,
        _ => Confidence::Medium,
    }
}

/// Parse a food estimate reply. A reply that is not valid JSON (or carries
/// no usable fields) degrades to a zero-calorie, low-confidence placeholder
/// named after the user's own description — valid but low-confidence, never
/// an error.
#[must_use]
pub fn parse_food_estimate(raw_text: &str, fallback_name: &str) -> FoodEstimate {
    let payload = strip_code_fence(raw_text);

    let Ok(raw) = serde_json::from_str::<RawFoodEstimate>(payload) else {
        return degraded_food_estimate(fallback_name);
    };

    let macros = match (raw.protein, raw.carbs, raw.fat) {
        (None, None, None) => None,
        (p, c, f) => Some(Macros {
            protein: p.unwrap_or(0.0),
            carbs: c.unwrap_or(0.0),
            fat: f.unwrap_or(0.0),
        }),
    };

    FoodEstimate {
        food_name: raw
            .food_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string()),
        calories: raw.calories.unwrap_or(0.0),
        macros,
        confidence: parse_confidence(raw.confidence.as_deref()),
        serving_size: raw.serving_size,
    }
}

#[must_use]
pub fn degraded_food_estimate(fallback_name: &str) -> FoodEstimate {
    FoodEstimate {
        food_name: fallback_name.to_string(),
        calories: 0.0,
        macros: None,
        confidence: Confidence::Low,
        serving_size: None,
    }
}

/// Parse an exercise estimate reply. `None` when the reply is unusable;
/// the caller falls back to the local heuristic.
#[must_use]
pub fn parse_exercise_estimate(raw_text: &str) -> Option<ExerciseEstimate> {
    let payload = strip_code_fence(raw_text);
    let raw: RawExerciseEstimate = serde_json::from_str(payload).ok()?;
    raw.calories.map(|calories| ExerciseEstimate { calories })
}
