//! External text/structured generation collaborator.
//!
//! Everything here is request/response: the engine builds prompts and
//! validates responses, while the generation itself happens behind the
//! [`TextGenerator`] trait so tests inject deterministic stubs. Failures
//! surface immediately; any retry policy belongs to the caller.

pub mod forecast;
pub mod gemini;
pub mod notes;
pub mod reminder;

pub use forecast::{generate_cash_flow_forecast, CashFlowForecast, ForecastEntry, ForecastRequest};
pub use gemini::{GeminiClient, GeminiConfig};
pub use notes::payment_history_notes;
pub use reminder::{
    generate_dashboard_summary, generate_reminder, run_reminder_batch, ReminderOutcome,
};

use async_trait::async_trait;

/// Errors surfaced by the generation collaborator.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error while building a request.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The collaborator rejected the configured credential.
    #[error("Invalid credential: {0}")]
    Credential(String),

    /// The collaborator is unreachable or returned a server failure.
    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    /// The response did not match the expected structure.
    #[error("Malformed response: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Narrow contract to the external generation collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate free-form text from a prompt.
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Generate JSON constrained by `schema`.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError>;

    /// Generator name for logging.
    fn name(&self) -> &str;
}

/// Generator returning canned responses, for tests and offline runs.
pub struct StaticGenerator {
    text: String,
    structured: serde_json::Value,
}

impl StaticGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            structured: serde_json::Value::Null,
        }
    }

    pub fn with_structured(mut self, structured: serde_json::Value) -> Self {
        self.structured = structured;
        self
    }
}

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate_text(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.text.clone())
    }

    async fn generate_structured(
        &self,
        _prompt: &str,
        _schema: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError> {
        Ok(self.structured.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
