//! # Database Error Types
//!
//! Error types for database operations and the combined operation error.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Domain (CoreError) | Db (DbError)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Request boundary maps Domain → 4xx-equivalent, Db → 5xx-equivalent    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use storefront_core::CoreError;

// =============================================================================
// DbError
// =============================================================================

/// Database operation errors.
///
/// These wrap sqlx errors and provide categorization. They are the
/// infrastructure side of the taxonomy: a caller should treat any of
/// them as "something below the business rules failed".
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate product name slipping past the domain-level check
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction commit failed.
    ///
    /// ## When This Occurs
    /// The writes inside the transaction succeeded but the commit itself
    /// did not; nothing was persisted.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Wraps a commit failure. Used by the transactional write paths.
    pub(crate) fn commit_failed(err: sqlx::Error) -> Self {
        DbError::TransactionFailed(err.to_string())
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for low-level database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// StoreError
// =============================================================================

/// The error type returned by every domain operation.
///
/// Joins the business-rule taxonomy (`CoreError`) with the
/// infrastructure taxonomy (`DbError`). Nothing is recovered silently:
/// every failure propagates to the caller as one of these.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A business rule was violated (maps to a 4xx-equivalent response).
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// The storage layer failed (maps to a 5xx-equivalent response).
    #[error(transparent)]
    Db(#[from] DbError),
}

impl StoreError {
    /// True when the error is a business-rule failure rather than an
    /// infrastructure fault.
    pub fn is_domain(&self) -> bool {
        matches!(self, StoreError::Domain(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Db(DbError::from(err))
    }
}

impl From<storefront_core::ValidationError> for StoreError {
    fn from(err: storefront_core::ValidationError) -> Self {
        StoreError::Domain(CoreError::Validation(err))
    }
}

/// Result type for domain operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_classification() {
        let err = StoreError::Domain(CoreError::DuplicateName("Widget".to_string()));
        assert!(err.is_domain());

        let err = StoreError::Db(DbError::PoolExhausted);
        assert!(!err.is_domain());
    }

    #[test]
    fn test_error_messages_pass_through() {
        let err = StoreError::Domain(CoreError::ProductNotFound("p-1".to_string()));
        assert_eq!(err.to_string(), "Product not found: p-1");

        let err = StoreError::Db(DbError::NotFound {
            entity: "Inventory".to_string(),
            id: "p-1".to_string(),
        });
        assert_eq!(err.to_string(), "Inventory not found: p-1");
    }

    #[test]
    fn test_commit_failure_is_infrastructure() {
        let err = DbError::commit_failed(sqlx::Error::PoolClosed);
        assert!(matches!(err, DbError::TransactionFailed(_)));
        assert!(err.to_string().starts_with("Transaction failed"));

        // Commit failures surface as 5xx-equivalent, not business errors
        let err = StoreError::Db(err);
        assert!(!err.is_domain());
    }
}
