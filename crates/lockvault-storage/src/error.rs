use lockvault_network::ApiError;
use thiserror::Error;

/// Session store error types.
///
/// These errors represent failures while loading, repairing or persisting
/// the local session config.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Required local configuration is missing and cannot be derived from the API
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// API call made while repairing the config failed
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Config file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file exists but is not a valid config document
    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
