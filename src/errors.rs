use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Search request failed or returned something that is not an envelope
    #[error("Search transport error: {0}")]
    SearchTransport(String),
    /// Search envelope came back with `success = false`
    #[error("Search failed: {0}")]
    SearchApplication(String),
    /// Export request failed or returned a non-2xx status
    #[error("Export error: {0}")]
    ExportTransport(String),
    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    UrlError(String),
    /// Configuration could not be loaded or validated
    #[error("Config error: {0}")]
    Config(String),
    /// Invalid input format
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(String),
}

// Conversion implementations for common errors
impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::UrlError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(err: std::num::ParseFloatError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;
