use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use vital_core::error::TrackerError;
use vital_core::estimate::{
    Content, ExerciseEstimate, FoodEstimate, GenerateRequest, GenerateResponse, InlineData, Part,
    Tool, exercise_prompt, food_prompt, parse_exercise_estimate, parse_food_estimate,
};
use vital_core::service::EstimationProvider;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-2.0-flash";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    rt: tokio::runtime::Handle,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(format!("vital-cli/{} (health tracker)", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            api_key,
            rt: tokio::runtime::Handle::current(),
        }
    }

    async fn generate_async(
        &self,
        parts: Vec<Part>,
        web_search: bool,
    ) -> Result<String, TrackerError> {
        let request = GenerateRequest {
            contents: vec![Content { parts }],
            tools: if web_search {
                vec![Tool::web_search()]
            } else {
                vec![]
            },
        };

        let url = format!("{API_BASE}/{MODEL}:generateContent");
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TrackerError::remote(format!("Failed to reach estimation API: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TrackerError::remote(format!(
                "Estimation API returned {status}"
            )));
        }

        let data: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| TrackerError::Parse(format!("Invalid estimation response: {e}")))?;

        data.first_text()
            .ok_or_else(|| TrackerError::Parse("Estimation response carried no text".to_string()))
    }

    pub async fn estimate_food_async(
        &self,
        image_jpeg: Option<&[u8]>,
        description: Option<&str>,
    ) -> Result<FoodEstimate, TrackerError> {
        let mut parts = vec![Part::Text(food_prompt(description, image_jpeg.is_some()))];
        if let Some(bytes) = image_jpeg {
            parts.push(Part::InlineData(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: BASE64.encode(bytes),
            }));
        }

        let text = self.generate_async(parts, true).await?;
        let fallback = description.unwrap_or("food");
        // A reply we cannot parse is still a usable (low-confidence) result.
        Ok(parse_food_estimate(&text, fallback))
    }

    pub async fn estimate_exercise_async(
        &self,
        activity: &str,
        duration_minutes: f64,
    ) -> Result<ExerciseEstimate, TrackerError> {
        let text = self
            .generate_async(
                vec![Part::Text(exercise_prompt(activity, duration_minutes))],
                false,
            )
            .await?;
        parse_exercise_estimate(&text).ok_or_else(|| {
            TrackerError::Parse("Estimation response carried no calorie figure".to_string())
        })
    }
}

// The provider trait is synchronous; bridge onto the runtime we were
// created on. block_in_place keeps the worker thread legal to block on.
impl EstimationProvider for GeminiClient {
    fn estimate_food(
        &self,
        image_jpeg: Option<&[u8]>,
        description: Option<&str>,
    ) -> Result<FoodEstimate, TrackerError> {
        tokio::task::block_in_place(|| {
            self.rt
                .block_on(self.estimate_food_async(image_jpeg, description))
        })
    }

    fn estimate_exercise(
        &self,
        activity: &str,
        duration_minutes: f64,
    ) -> Result<ExerciseEstimate, TrackerError> {
        tokio::task::block_in_place(|| {
            self.rt
                .block_on(self.estimate_exercise_async(activity, duration_minutes))
        })
    }
}
