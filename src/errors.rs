//! Unified error type for the equity engine and its collaborators.

use crate::core::validation::ValidationReport;
use thiserror::Error;

/// Every failure the crate can surface.
///
/// The ownership engine itself never fails; errors come from the admission
/// boundary (validation), session lookups, configuration, and the draft store.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A money amount was zero, negative, or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// One or more input fields failed validation
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    /// An entity id did not match anything in the session or store
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity (founder, round, draft)
        entity: &'static str,
        /// The id that was looked up
        id: String,
    },

    /// The explanation service failed
    #[error("Explanation service error: {message}")]
    Explanation {
        /// Transport or service message
        message: String,
    },

    /// Database error from the draft store
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
