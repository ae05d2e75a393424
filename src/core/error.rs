use thiserror::Error;

/// Centralized error types for the application
///
/// Every pipeline stage reports through one of these variants. None of them
/// is retried anywhere: a failure is terminal for the request that hit it.
///
/// # Example
///
/// ```no_run
/// use audiorelay::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Metadata resolution failed (unreachable/unsupported URL, no title)
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Audio stream or thumbnail download failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Tag frames could not be written
    #[error("Tag error: {0}")]
    Tag(String),

    /// Either delivery transport failed
    #[error("Upload error: {0}")]
    Upload(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Short category name, used in log lines
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Extraction(_) => "extraction",
            AppError::Fetch(_) => "fetch",
            AppError::Tag(_) => "tag",
            AppError::Upload(_) => "upload",
            AppError::Io(_) => "io",
            AppError::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

impl From<teloxide::RequestError> for AppError {
    fn from(err: teloxide::RequestError) -> Self {
        AppError::Upload(format!("Bot API: {}", err))
    }
}
