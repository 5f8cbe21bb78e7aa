//! Error types for the antarctic explorer service

/// Errors that can occur in the antarctic explorer service
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dashboard error: {0}")]
    Dashboard(String),
}

/// Result type alias for antarctic explorer operations
pub type Result<T> = std::result::Result<T, ExplorerError>;
