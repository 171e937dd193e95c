//! Error types for the lending engine.

use crate::model::MaterialId;
use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type alias for repository operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during engine operation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid command record
    #[error("Invalid command at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Missing input file argument
    #[error("Missing input file argument. Usage: lending-engine <commands.csv>")]
    MissingArgument,

    /// No material with this id exists
    #[error("Unknown material {id}")]
    UnknownMaterial { id: MaterialId },

    /// Deletion refused because reservations or checkouts still reference the record
    #[error("{entity} {id} is still referenced by {references} record(s)")]
    InUse {
        entity: &'static str,
        id: u64,
        references: usize,
    },

    /// Field-level validation failure
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Repository-layer failure, never retried
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

/// Field-level validation failures, surfaced as messages rather than aborts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Start or end date is missing
    #[error("start and end date are required")]
    MissingDates,

    /// End date lies before start date
    #[error("end date {end} must not be before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    /// Name is empty or whitespace only
    #[error("name must not be blank")]
    BlankName,

    /// Checkout attempted with nothing in the cart
    #[error("no items selected for checkout")]
    EmptyCart,
}

/// Failures reported by a repository backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Record with this id does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// Backend-specific failure
    #[error("storage backend failure: {0}")]
    Backend(String),
}
