use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Gemini error: {0}")]
    Gemini(#[from] crate::gemini::GeminiError),

    #[error("Other error: {0}")]
    Other(String),
}
