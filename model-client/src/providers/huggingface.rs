//! Hugging Face inference provider
//!
//! Direct HTTP implementation of the text-classification task.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ModelError, Result};
use crate::provider::{Emotion, EmotionClassifier, EmotionPrediction};

pub const HUGGINGFACE_API_URL: &str = "https://api-inference.huggingface.co";

/// Emotion classifier backed by a hosted text-classification model
pub struct HuggingFaceClassifier {
    model: String,
    base_url: String,
    api_key: String,
    client: Client,
}

impl HuggingFaceClassifier {
    /// Create a new classifier for `model`
    pub fn new(
        model: &str,
        api_key: String,
        base_url: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ModelError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            model: model.to_string(),
            base_url: base_url
                .unwrap_or(HUGGINGFACE_API_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }
}

// Inference API request/response types

#[derive(Debug, Serialize)]
struct ClassificationRequest<'a> {
    inputs: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// The API returns either every label per input (ranked) or the single
/// best label per input (flat), depending on the model's pipeline settings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Ranked(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

fn best_label(candidates: &[LabelScore]) -> Option<&LabelScore> {
    candidates
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
}

fn to_prediction(label: &LabelScore) -> Result<EmotionPrediction> {
    Ok(EmotionPrediction {
        emotion: Emotion::from_label(&label.label)?,
        score: label.score.clamp(0.0, 1.0),
    })
}

fn parse_predictions(body: &str, expected: usize) -> Result<Vec<EmotionPrediction>> {
    let response: ClassificationResponse = serde_json::from_str(body)
        .map_err(|e| ModelError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

    let predictions = match response {
        ClassificationResponse::Ranked(rows) => rows
            .iter()
            .map(|row| {
                best_label(row)
                    .ok_or_else(|| ModelError::MalformedResponse("empty label list".to_string()))
                    .and_then(to_prediction)
            })
            .collect::<Result<Vec<_>>>()?,
        ClassificationResponse::Flat(labels) => labels
            .iter()
            .map(to_prediction)
            .collect::<Result<Vec<_>>>()?,
    };

    if predictions.len() != expected {
        return Err(ModelError::MalformedResponse(format!(
            "expected {} predictions, got {}",
            expected,
            predictions.len()
        )));
    }

    Ok(predictions)
}

#[async_trait]
impl EmotionClassifier for HuggingFaceClassifier {
    async fn classify(&self, sentences: &[String]) -> Result<Vec<EmotionPrediction>> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&ClassificationRequest { inputs: sentences })
            .send()
            .await
            .map_err(|e| ModelError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error
                } else {
                    error_text
                };

            return Err(match status.as_u16() {
                429 => ModelError::RateLimited { retry_after },
                503 => ModelError::ModelLoading { message },
                code => ModelError::ApiError {
                    message,
                    status_code: Some(code),
                },
            });
        }

        let body = response.text().await.map_err(|e| ModelError::ApiError {
            message: format!("Failed to read response: {}", e),
            status_code: None,
        })?;

        parse_predictions(&body, sentences.len())
    }

    fn name(&self) -> &'static str {
        "Hugging Face Inference"
    }

    fn is_available(&self) -> Result<()> {
        // API key was provided in constructor
        Ok(())
    }
}
