//! Identity identifiers and their stored rank records.

use crate::Rank;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque 128-bit identity identifier.
///
/// Persisted as the 36-character hyphenated UUID text form.
///
/// # Examples
///
/// ```
/// use rankwarden_core::IdentityId;
///
/// let id: IdentityId = "069a79f4-44e9-4726-a5be-fca90e38aaf5".parse().unwrap();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("{}", _0)]
#[serde(transparent)]
pub struct IdentityId(Uuid);

impl IdentityId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for IdentityId {
    type Err = ParseIdentityError;

    /// Accepts hyphenated or simple (32 hex digit) UUID text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| ParseIdentityError {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Text that is not a valid identity identifier.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Invalid identity id '{}': {}", input, reason)]
pub struct ParseIdentityError {
    /// The rejected input
    pub input: String,
    /// Why parsing failed
    pub reason: String,
}

/// The durable rank of one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct IdentityRankRecord {
    identity_id: IdentityId,
    rank: Rank,
}

impl IdentityRankRecord {
    /// Create a record.
    pub fn new(identity_id: IdentityId, rank: Rank) -> Self {
        Self { identity_id, rank }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_form_parses_to_hyphenated() {
        let id: IdentityId = "069a79f444e94726a5befca90e38aaf5".parse().unwrap();
        assert_eq!(id.to_string(), "069a79f4-44e9-4726-a5be-fca90e38aaf5");
    }

    #[test]
    fn test_invalid_identity_rejected() {
        let err = "not-a-uuid".parse::<IdentityId>().unwrap_err();
        assert_eq!(err.input, "not-a-uuid");
    }

    #[test]
    fn test_record_exposes_identity_and_rank() {
        let id = IdentityId::new_random();
        let record = IdentityRankRecord::new(id, Rank::Moderator);
        assert_eq!(*record.identity_id(), id);
        assert_eq!(*record.rank(), Rank::Moderator);
    }
}
