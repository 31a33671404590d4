use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Backend returned HTTP {status} for {endpoint}")]
    BackendStatus { endpoint: &'static str, status: u16 },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<&str> for PanelError {
    fn from(error: &str) -> Self {
        PanelError::ConfigError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
