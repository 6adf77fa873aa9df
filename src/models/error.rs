use thiserror::Error;

#[derive(Error, Debug)]
pub enum BadgeError {
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    #[error("ENS {stage} lookup failed: {message}")]
    Lookup { stage: &'static str, message: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Etherscan API failed: {payload}")]
    Provider { payload: serde_json::Value },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BadgeError {
    pub fn lookup(stage: &'static str, err: impl std::fmt::Display) -> Self {
        BadgeError::Lookup {
            stage,
            message: err.to_string(),
        }
    }

    pub fn render(err: impl std::fmt::Display) -> Self {
        BadgeError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BadgeError>;
