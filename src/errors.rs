use thiserror::Error;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("validation failed for {entity}: {reason}")]
    Validation { entity: String, reason: String },
    #[error("unknown student: {0}")]
    UnknownStudent(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl LedgerError {
    /// Builds a validation error carrying the offending entity id.
    pub fn validation(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            entity: entity.into(),
            reason: reason.into(),
        }
    }
}
