//! Common error types for Fyyur

use crate::forms::ValidationErrors;
use thiserror::Error;

/// Common result type for Fyyur operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the store, the projector and the service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A show references a venue or artist that does not exist
    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Submitted form failed validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Stored data could not be interpreted (e.g. unparseable show start time)
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// A stored timestamp has no UTC offset and cannot be compared with an aware one
    #[error("Naive timestamp cannot be compared with an aware one: {0}")]
    NaiveTimestamp(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_foreign_key_violation() {
                return Error::ReferentialIntegrity(db_err.message().to_string());
            }
        }
        Error::Database(err)
    }
}

impl Error {
    /// True for failures caused by corrupt stored data rather than by the request
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, Error::DataIntegrity(_) | Error::NaiveTimestamp(_))
    }
}
