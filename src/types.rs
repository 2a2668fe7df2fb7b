// Type definitions and errors

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to read archive: {0}")]
    Archive(String),

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
