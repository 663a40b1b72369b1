//! The fixed, totally ordered rank table.
//!
//! Ranks carry no behavior of their own: every attribute lives in
//! [`RANK_TABLE`] and the helpers in this module are pure lookups over it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A privilege rank.
///
/// Variants are declared in [`RANK_TABLE`] order, highest privilege first.
/// `Display` renders the storage key persisted in the rank store.
///
/// # Examples
///
/// ```
/// use rankwarden_core::Rank;
///
/// assert!(Rank::Owner > Rank::Moderator);
/// assert_eq!(Rank::MvpPlus.to_string(), "MVP_PLUS");
/// assert_eq!(Rank::MvpPlus.display_name(), "MVP+");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rank {
    /// Server owner
    #[display("OWNER")]
    Owner,
    /// Developer rank (not a staff rank)
    #[display("ENGINEER")]
    Engineer,
    /// Administrator
    #[display("ADMINISTRATOR")]
    Administrator,
    /// Moderator
    #[display("MODERATOR")]
    Moderator,
    /// Helper
    #[display("HELPER")]
    Helper,
    /// Builder
    #[display("BUILDER")]
    Builder,
    /// Media
    #[display("MEDIA")]
    Media,
    /// MVP+
    #[display("MVP_PLUS")]
    MvpPlus,
    /// MVP
    #[display("MVP")]
    Mvp,
    /// VIP+
    #[display("VIP_PLUS")]
    VipPlus,
    /// VIP
    #[display("VIP")]
    Vip,
    /// Default rank for every identity
    #[display("MEMBER")]
    Member,
}

/// One row of the rank table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankRecord {
    rank: Rank,
    storage_key: &'static str,
    display_name: &'static str,
    color_code: char,
    level: u8,
}

impl RankRecord {
    const fn new(
        rank: Rank,
        storage_key: &'static str,
        display_name: &'static str,
        color_code: char,
        level: u8,
    ) -> Self {
        Self {
            rank,
            storage_key,
            display_name,
            color_code,
            level,
        }
    }

    /// The rank this row describes.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Key persisted in the `rank` column.
    pub fn storage_key(&self) -> &'static str {
        self.storage_key
    }

    /// Name shown to players.
    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// Legacy color code used when rendering the rank prefix.
    pub fn color_code(&self) -> char {
        self.color_code
    }

    /// Numeric privilege level; higher means more privileged.
    pub fn level(&self) -> u8 {
        self.level
    }
}

/// Every rank, highest privilege first.
pub const RANK_TABLE: [RankRecord; 12] = [
    RankRecord::new(Rank::Owner, "OWNER", "OWNER", '4', 100),
    RankRecord::new(Rank::Engineer, "ENGINEER", "ENGINEER", '5', 95),
    RankRecord::new(Rank::Administrator, "ADMINISTRATOR", "ADMINISTRATOR", 'c', 90),
    RankRecord::new(Rank::Moderator, "MODERATOR", "MODERATOR", '6', 80),
    RankRecord::new(Rank::Helper, "HELPER", "HELPER", '9', 40),
    RankRecord::new(Rank::Builder, "BUILDER", "BUILDER", '1', 30),
    RankRecord::new(Rank::Media, "MEDIA", "MEDIA", 'd', 25),
    RankRecord::new(Rank::MvpPlus, "MVP_PLUS", "MVP+", 'b', 20),
    RankRecord::new(Rank::Mvp, "MVP", "MVP", '3', 15),
    RankRecord::new(Rank::VipPlus, "VIP_PLUS", "VIP+", 'a', 10),
    RankRecord::new(Rank::Vip, "VIP", "VIP", '2', 5),
    RankRecord::new(Rank::Member, "MEMBER", "MEMBER", '8', 0),
];

/// Look up the table row for a rank.
pub fn rank_record(rank: Rank) -> &'static RankRecord {
    &RANK_TABLE[rank as usize]
}

/// All ranks in table order.
pub fn all_ranks() -> impl Iterator<Item = Rank> {
    RANK_TABLE.iter().map(RankRecord::rank)
}

/// Ranks whose level is greater than or equal to `level`, in table order.
///
/// # Examples
///
/// ```
/// use rankwarden_core::{Rank, ranks_with_level_at_least};
///
/// let staff = ranks_with_level_at_least(80);
/// assert_eq!(
///     staff,
///     vec![Rank::Owner, Rank::Engineer, Rank::Administrator, Rank::Moderator]
/// );
/// ```
pub fn ranks_with_level_at_least(level: u8) -> Vec<Rank> {
    RANK_TABLE
        .iter()
        .filter(|record| record.level >= level)
        .map(RankRecord::rank)
        .collect()
}

impl Rank {
    /// Default rank materialized for identities with no stored record.
    pub const DEFAULT: Rank = Rank::Member;

    /// Numeric privilege level.
    pub fn level(self) -> u8 {
        rank_record(self).level
    }

    /// Name shown to players.
    pub fn display_name(self) -> &'static str {
        rank_record(self).display_name
    }

    /// Legacy color code for the rank prefix.
    pub fn color_code(self) -> char {
        rank_record(self).color_code
    }

    /// Key persisted in the store.
    pub fn storage_key(self) -> &'static str {
        rank_record(self).storage_key
    }

    /// Whether this rank has at least the privilege of `other`.
    pub fn outranks_or_equals(self, other: Rank) -> bool {
        self.level() >= other.level()
    }

    /// Parse an exact storage key as read back from the store.
    pub fn from_storage_key(key: &str) -> Result<Rank, ParseRankError> {
        RANK_TABLE
            .iter()
            .find(|record| record.storage_key == key)
            .map(RankRecord::rank)
            .ok_or_else(|| ParseRankError::new(key))
    }

    /// Parse operator input: storage key or display name, any case.
    ///
    /// # Examples
    ///
    /// ```
    /// use rankwarden_core::Rank;
    ///
    /// assert_eq!(Rank::parse("vip+").unwrap(), Rank::VipPlus);
    /// assert_eq!(Rank::parse("Vip_Plus").unwrap(), Rank::VipPlus);
    /// assert!(Rank::parse("emperor").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Rank, ParseRankError> {
        let input = input.trim();
        RANK_TABLE
            .iter()
            .find(|record| {
                record.storage_key.eq_ignore_ascii_case(input)
                    || record.display_name.eq_ignore_ascii_case(input)
            })
            .map(RankRecord::rank)
            .ok_or_else(|| ParseRankError::new(input))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::str::FromStr for Rank {
    type Err = ParseRankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rank::parse(s)
    }
}

/// Input that names no known rank.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Unknown rank '{}'", input)]
pub struct ParseRankError {
    /// The rejected input
    pub input: String,
}

impl ParseRankError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}
