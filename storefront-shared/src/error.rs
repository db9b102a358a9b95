/// Error taxonomy for maintenance operations
///
/// Every operation in this crate returns `MaintenanceResult<T>`. The variants
/// map one-to-one onto how callers react:
///
/// - `Connectivity`: the store is unreachable. Scripts exit non-zero.
/// - `NotFound`: the targeted record does not exist. Re-runnable operations
///   treat this as a logged no-op.
/// - `Validation`: the input was rejected before anything was written.
/// - `ConstraintViolation`: the store refused the write (unique, check or
///   foreign-key constraint). The statement was aborted, nothing persisted.
/// - `Database`: any other store error.
/// - `Io`: local file errors (flag file).

/// Result alias used across the shared crate
pub type MaintenanceResult<T> = Result<T, MaintenanceError>;

/// Error type for maintenance operations
#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    /// Data store or dependent service unreachable
    #[error("Connectivity failure: {0}")]
    Connectivity(String),

    /// Targeted record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected before touching the store
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Write refused by a store constraint
    #[error("Constraint violation ({constraint}): {message}")]
    ConstraintViolation {
        /// Constraint name reported by the store, or the SQLSTATE when unnamed
        constraint: String,
        /// Store-provided message
        message: String,
    },

    /// Any other database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Flag file read/write failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MaintenanceError {
    /// Whether the error means the store could not be reached at all
    pub fn is_connectivity(&self) -> bool {
        matches!(self, MaintenanceError::Connectivity(_))
    }
}

/// Classifies sqlx errors into the maintenance taxonomy
///
/// SQLSTATE class `23` (integrity constraint violation) becomes
/// `ConstraintViolation`; transport-level failures become `Connectivity`.
impl From<sqlx::Error> for MaintenanceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => MaintenanceError::NotFound("Row not found".to_string()),
            sqlx::Error::Io(e) => MaintenanceError::Connectivity(e.to_string()),
            sqlx::Error::Tls(e) => MaintenanceError::Connectivity(e.to_string()),
            sqlx::Error::PoolTimedOut => {
                MaintenanceError::Connectivity("Timed out acquiring a connection".to_string())
            }
            sqlx::Error::PoolClosed => {
                MaintenanceError::Connectivity("Connection pool is closed".to_string())
            }
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.into_owned());
                let is_integrity = code.as_deref().map(|c| c.starts_with("23")).unwrap_or(false);

                if is_integrity || db_err.constraint().is_some() {
                    let constraint = db_err
                        .constraint()
                        .map(str::to_string)
                        .or(code)
                        .unwrap_or_else(|| "unknown".to_string());

                    return MaintenanceError::ConstraintViolation {
                        constraint,
                        message: db_err.message().to_string(),
                    };
                }

                MaintenanceError::Database(sqlx::Error::Database(db_err))
            }
            other => MaintenanceError::Database(other),
        }
    }
}
