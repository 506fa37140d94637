use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Debits ({debits}) must equal credits ({credits})")]
    Unbalanced { debits: Decimal, credits: Decimal },

    #[error("Journal entry must have at least two lines")]
    TooFewLines,

    #[error("Each journal line must have exactly one of debit or credit, greater than zero")]
    InvalidLine,

    #[error("Account {code} is inactive")]
    InactiveAccount { code: String },

    #[error("Invalid status transition: {0}")]
    InvalidStatus(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AccountingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }
}

pub type AccountingResult<T> = Result<T, AccountingError>;
