//! [`ClassifierClient`]: HTTP client for the tagd JSON API.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{ClassificationResult, ClassifyRequest};
use crate::{ClassifierError, Result};

/// Address tagd listens on by default.
pub const DEFAULT_URL: &str = "http://localhost:8766";

/// Body of `GET /`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub timestamp: String,
    pub version: String,
}

/// Body of `GET /info`.
#[derive(Debug, Clone, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub model: String,
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for a remote tagd server.
///
/// # Example
///
/// ```ignore
/// let client = ClassifierClient::new("http://127.0.0.1:8766")?;
/// let result = client
///     .classify(&ClassifyRequest::new(["dog", "park"], ["animals", "sports"]))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: Client,
    base_url: String,
}

impl ClassifierClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(crate::version::user_agent())
            .build()
            .map_err(|e| ClassifierError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/").await
    }

    pub async fn info(&self) -> Result<InfoResponse> {
        self.get("/info").await
    }

    /// `POST /classify`. Non-2xx answers become [`ClassifierError::Api`]
    /// carrying the server's error message.
    pub async fn classify(&self, request: &ClassifyRequest) -> Result<ClassificationResult> {
        let url = format!("{}/classify", self.base_url);
        debug!(%url, tags = request.tags.len(), "sending classification request");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClassifierError::Http(format!("request to {url} failed: {e}")))?;
        decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClassifierError::Http(format!("request to {url} failed: {e}")))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClassifierError::Http(format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        return Err(ClassifierError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&body)?)
}
