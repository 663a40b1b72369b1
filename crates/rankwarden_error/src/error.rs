//! Top-level error wrapper types.

use crate::{ConfigError, DatabaseError, PermissionError};

/// Every error the workspace can surface to a binary or host.
///
/// # Examples
///
/// ```
/// use rankwarden_error::{ConfigError, RankwardenError};
///
/// let err: RankwardenError = ConfigError::new("missing host").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum RankwardenErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Database error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Permission orchestration error
    #[from(PermissionError)]
    Permission(PermissionError),
}

/// Rankwarden error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Rankwarden Error: {}", _0)]
pub struct RankwardenError(Box<RankwardenErrorKind>);

impl RankwardenError {
    /// Create a new error from a kind.
    pub fn new(kind: RankwardenErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RankwardenErrorKind {
        &self.0
    }
}

impl<T> From<T> for RankwardenError
where
    T: Into<RankwardenErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Rankwarden operations.
pub type RankwardenResult<T> = std::result::Result<T, RankwardenError>;
