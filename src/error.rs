use thiserror::Error;

#[derive(Debug, Error)]
pub enum TryOnError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Read error: {0}")]
    Read(String),
    #[error("Upload error: {0}")]
    Upload(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, TryOnError>;
