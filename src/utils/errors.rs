use thiserror::Error;

#[derive(Error, Debug)]
pub enum SokuError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised at registration time when kind/source/output are malformed
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A deferred compiler implementation failed to resolve
    #[error("Implementation error: {0}")]
    Implementation(String),
}

impl SokuError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn implementation(message: impl Into<String>) -> Self {
        Self::Implementation(message.into())
    }

    /// True for errors the caller can fix by changing its registration arguments
    pub fn is_validation(&self) -> bool {
        matches!(self, SokuError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, SokuError>;

impl From<regex::Error> for SokuError {
    fn from(err: regex::Error) -> Self {
        SokuError::config(format!("Regex error: {}", err))
    }
}
