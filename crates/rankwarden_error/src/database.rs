//! Database error types.

/// Database error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum DatabaseErrorKind {
    /// A pooled connection could not be produced
    #[display("Database connection error: {}", _0)]
    Connection(String),
    /// Query execution failed
    #[display("Database query error: {}", _0)]
    Query(String),
    /// A stored value could not be decoded
    #[display("Serialization error: {}", _0)]
    Serialization(String),
    /// The blocking worker running the statement failed
    #[display("Database worker error: {}", _0)]
    Worker(String),
    /// The client was disconnected
    #[display("Database client is closed")]
    Closed,
}

/// Database error with source location tracking.
///
/// # Examples
///
/// ```
/// use rankwarden_error::{DatabaseError, DatabaseErrorKind};
///
/// let err = DatabaseError::new(DatabaseErrorKind::Closed);
/// assert!(format!("{}", err).contains("closed"));
/// assert!(err.is_closed());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Database Error: {} at line {} in {}", kind, line, file)]
pub struct DatabaseError {
    /// The kind of error that occurred
    pub kind: DatabaseErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DatabaseError {
    /// Create a new DatabaseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DatabaseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DatabaseErrorKind {
        &self.kind
    }

    /// Whether the error was caused by using a disconnected client.
    pub fn is_closed(&self) -> bool {
        matches!(self.kind, DatabaseErrorKind::Closed)
    }
}

// Diesel error conversions (only available with database feature)
#[cfg(feature = "database")]
impl From<diesel::result::Error> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        DatabaseError::new(DatabaseErrorKind::Query(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        DatabaseError::new(DatabaseErrorKind::Connection(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<diesel::r2d2::PoolError> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::r2d2::PoolError) -> Self {
        DatabaseError::new(DatabaseErrorKind::Connection(err.to_string()))
    }
}
