//! Gemini API client behind the [`TextGenerator`] trait.
//!
//! Talks to the `generateContent` REST endpoint. Structured calls pin the
//! response to a JSON schema via `generationConfig`. Failures are classified
//! but never retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use super::{GenerationError, TextGenerator};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,

    /// Model name, e.g. `gemini-2.5-flash`.
    pub model: String,

    /// API base URL.
    pub endpoint: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create config from environment variables.
    ///
    /// - `GEMINI_API_KEY`: required
    /// - `GEMINI_MODEL`: optional model override
    /// - `GEMINI_TIMEOUT`: optional timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GenerationError::Config("GEMINI_API_KEY not set".to_string()))?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(timeout_secs) = std::env::var("GEMINI_TIMEOUT")
            .ok()
            .and_then(|raw| raw.parse().ok())
        {
            config.timeout = Duration::from_secs(timeout_secs);
        }
        Ok(config)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `generateContent` response, reduced to the fields the engine reads.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find_map(|part| part.text.clone())
    }
}

/// HTTP client for the Gemini `generateContent` API.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::Config(
                "Gemini API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GenerationError::Http)?;

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, GenerationError> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Maps a non-success HTTP status to the matching error class.
    ///
    /// 401/403 mean a bad credential; so does the API's habit of answering
    /// 400 with an "API key not valid" body. 429 and 5xx mean the service
    /// cannot take the call right now. Anything else is a request we built
    /// wrong, which is a configuration problem.
    fn classify_status(status: StatusCode, body: &str) -> GenerationError {
        let summary = format!(
            "HTTP {} - {}",
            status,
            body.chars().take(200).collect::<String>()
        );
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return GenerationError::Credential(summary);
        }
        if status == StatusCode::BAD_REQUEST && body.to_lowercase().contains("api key") {
            return GenerationError::Credential(summary);
        }
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return GenerationError::Unavailable(summary);
        }
        GenerationError::Config(summary)
    }

    async fn generate(
        &self,
        prompt: &str,
        generation_config: Option<serde_json::Value>,
    ) -> Result<String, GenerationError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        );
        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        if let Some(generation_config) = generation_config {
            body["generationConfig"] = generation_config;
        }

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let payload = response.text().await.unwrap_or_default();
            error!(model = %self.config.model, status = %status, "Gemini call failed");
            return Err(Self::classify_status(status, &payload));
        }

        let payload = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&payload)
            .map_err(|cause| GenerationError::InvalidResponse(cause.to_string()))?;
        parsed.first_text().ok_or_else(|| {
            GenerationError::InvalidResponse("response carries no text part".to_string())
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(model = %self.config.model, "requesting text generation");
        self.generate(prompt, None).await
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError> {
        debug!(model = %self.config.model, "requesting structured generation");
        let generation_config = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        });
        let text = self.generate(prompt, Some(generation_config)).await?;
        serde_json::from_str(text.trim())
            .map_err(|cause| GenerationError::InvalidResponse(cause.to_string()))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
