//! HuggingFace Inference API client for zero-shot classification.
//!
//! This client uses HuggingFace's serverless inference endpoints.
//! See: <https://huggingface.co/docs/api-inference/index>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{ClassifyProvider, LabelScores};
use crate::{ClassifierError, Result};

/// Default base URL for HuggingFace Inference API
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Client for the HuggingFace zero-shot classification pipeline.
///
/// The model is fixed at construction; every call is forwarded to
/// `{base_url}/models/{model}`.
#[derive(Clone)]
pub struct HuggingFaceClient {
    api_key: String,
    model: String,
    http: Client,
    base_url: String,
}

impl HuggingFaceClient {
    /// Create a new HuggingFace client for `model` with the given API key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(crate::version::user_agent())
            .build()
            .map_err(|e| ClassifierError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Perform zero-shot classification.
    ///
    /// # Arguments
    /// * `text` - Text to classify
    /// * `labels` - Candidate labels
    /// * `multi_label` - Score labels independently instead of as one softmax
    pub async fn classify(
        &self,
        text: &str,
        labels: &[&str],
        multi_label: bool,
    ) -> Result<LabelScores> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        debug!(model = %self.model, labels = labels.len(), multi_label, "huggingface zero-shot request");

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&ZeroShotRequest {
                inputs: text,
                parameters: ZeroShotParameters {
                    candidate_labels: labels,
                    multi_label,
                },
            })
            .send()
            .await
            .map_err(|e| ClassifierError::Http(e.to_string()))?;

        self.handle_response_errors(&response)?;

        let result: ZeroShotResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Http(e.to_string()))?;

        result.into_scores()
    }

    /// Check response status and map to appropriate error.
    fn handle_response_errors(&self, response: &reqwest::Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        match status.as_u16() {
            401 => Err(ClassifierError::AuthenticationFailed),
            404 => Err(ClassifierError::ModelNotFound(self.model.clone())),
            429 => {
                // Try to parse retry-after header
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(ClassifierError::RateLimited { retry_after })
            }
            503 => Err(ClassifierError::Api {
                status: 503,
                message: "Model is loading, please retry".to_string(),
            }),
            code => Err(ClassifierError::Api {
                status: code,
                message: format!("HuggingFace API error: {}", status),
            }),
        }
    }
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
    multi_label: bool,
}

/// The classic pipeline answers with parallel `labels`/`scores` columns;
/// newer inference endpoints answer with a list of `{label, score}` rows.
#[derive(Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Columns { labels: Vec<String>, scores: Vec<f32> },
    Rows(Vec<LabelScore>),
}

#[derive(Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

impl ZeroShotResponse {
    fn into_scores(self) -> Result<LabelScores> {
        match self {
            Self::Columns { labels, scores } => {
                if labels.len() != scores.len() {
                    return Err(ClassifierError::Model(format!(
                        "response has {} labels but {} scores",
                        labels.len(),
                        scores.len()
                    )));
                }
                if labels.is_empty() {
                    return Err(ClassifierError::EmptyResponse);
                }
                Ok(labels.into_iter().zip(scores).collect())
            }
            Self::Rows(rows) => {
                if rows.is_empty() {
                    return Err(ClassifierError::EmptyResponse);
                }
                Ok(rows.into_iter().map(|row| (row.label, row.score)).collect())
            }
        }
    }
}

#[async_trait]
impl ClassifyProvider for HuggingFaceClient {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn classify_zero_shot(
        &self,
        text: &str,
        labels: &[&str],
        multi_label: bool,
    ) -> Result<LabelScores> {
        HuggingFaceClient::classify(self, text, labels, multi_label).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_column_response() {
        let json = r#"{"sequence": "dog, park", "labels": ["animals", "landscape"], "scores": [0.9, 0.1]}"#;
        let parsed: ZeroShotResponse = serde_json::from_str(json).unwrap();
        let scores = parsed.into_scores().unwrap();
        assert_eq!(scores.len(), 2);
        assert!((scores["animals"] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn parses_row_response() {
        let json = r#"[{"label": "animals", "score": 0.8}, {"label": "food", "score": 0.2}]"#;
        let parsed: ZeroShotResponse = serde_json::from_str(json).unwrap();
        let scores = parsed.into_scores().unwrap();
        assert!((scores["food"] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn mismatched_columns_are_a_model_error() {
        let json = r#"{"labels": ["a", "b"], "scores": [1.0]}"#;
        let parsed: ZeroShotResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(parsed.into_scores(), Err(ClassifierError::Model(_))));
    }

    #[test]
    fn empty_rows_are_an_empty_response() {
        let parsed: ZeroShotResponse = serde_json::from_str("[]").unwrap();
        assert!(matches!(parsed.into_scores(), Err(ClassifierError::EmptyResponse)));
    }

    #[test]
    fn request_body_shape() {
        let labels = ["animals", "food"];
        let body = serde_json::to_value(ZeroShotRequest {
            inputs: "pizza, cheese",
            parameters: ZeroShotParameters {
                candidate_labels: &labels,
                multi_label: true,
            },
        })
        .unwrap();
        assert_eq!(body["inputs"], "pizza, cheese");
        assert_eq!(body["parameters"]["candidate_labels"][1], "food");
        assert_eq!(body["parameters"]["multi_label"], true);
    }
}
