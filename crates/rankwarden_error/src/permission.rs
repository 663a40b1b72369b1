//! Permission orchestration error types.

use crate::DatabaseError;

/// Permission orchestration error conditions.
#[derive(Debug, Clone, derive_more::Display)]
pub enum PermissionErrorKind {
    /// The store failed its boot-time health check
    #[display("Rank store is unavailable: {}", _0)]
    StoreUnavailable(String),

    /// Creating the rank table failed
    #[display("Failed to bootstrap rank schema: {}", _0)]
    SchemaBootstrap(DatabaseError),

    /// Seeding ranks for connected identities failed
    #[display("Failed to seed ranks for connected identities: {}", _0)]
    SeedFailure(DatabaseError),

    /// An orchestrator was already constructed for this slot
    #[display("Permission orchestrator is already initialized")]
    DuplicateInitialization,

    /// A store operation failed after bootstrap
    #[display("Rank store operation failed: {}", _0)]
    Store(DatabaseError),
}

/// Permission error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Permission Error: {} at line {} in {}", kind, line, file)]
pub struct PermissionError {
    /// The specific error kind
    pub kind: PermissionErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl PermissionError {
    /// Create a new permission error with location tracking.
    ///
    /// # Examples
    ///
    /// ```
    /// use rankwarden_error::{PermissionError, PermissionErrorKind};
    ///
    /// let err = PermissionError::new(PermissionErrorKind::DuplicateInitialization);
    /// assert!(err.is_fatal());
    /// ```
    #[track_caller]
    pub fn new(kind: PermissionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PermissionErrorKind {
        &self.kind
    }

    /// Fatal errors leave the permission subsystem non-operational; the host
    /// must disable the feature rather than keep serving requests.
    pub fn is_fatal(&self) -> bool {
        !matches!(self.kind, PermissionErrorKind::Store(_))
    }
}

impl From<DatabaseError> for PermissionError {
    #[track_caller]
    fn from(err: DatabaseError) -> Self {
        PermissionError::new(PermissionErrorKind::Store(err))
    }
}
