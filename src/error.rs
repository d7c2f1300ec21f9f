use crate::config::Difficulty;

/// Conditions that stop a session from being set up.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("no passages available for {0} difficulty")]
    DataUnavailable(Difficulty),
    #[error("failed to load passages: {0}")]
    Passages(String),
}

/// Failures persisting the personal best.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
