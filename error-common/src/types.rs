use thiserror::Error;

/// Simplified error enum for common use cases
#[derive(Error, Debug)]
pub enum MandirError {
    /// Network communication errors
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server configuration errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Authentication/authorization errors
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Ledger and journal-posting errors
    #[error("Accounting error: {0}")]
    AccountingError(String),

    /// Business logic errors
    #[error("Business logic error: {0}")]
    BusinessError(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Mandir ERP operations
pub type Result<T> = std::result::Result<T, MandirError>;

/// Async logging function for errors
pub async fn log_error(context: &str, error: &MandirError) {
    tracing::error!(
        context = context,
        error = %error,
        "Mandir ERP error occurred"
    );
}
