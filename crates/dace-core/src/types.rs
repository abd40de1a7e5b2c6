//! Record types shared by every store.
//!
//! All records derive both serde and bincode traits: serde for hosts that
//! expose state as JSON, bincode for the RocksDB store in `dace-node`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TRANSPARENCY_SCORE, MAX_SCORE, MIN_SCORE};
use crate::error::EvaluatorError;

/// Dense, zero-based charity identifier assigned in registration order.
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
    bincode::Encode,
    bincode::Decode,
)]
pub struct CharityId(pub u64);

impl CharityId {
    /// Big-endian key bytes. Sorting keys bytewise matches numeric order.
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for CharityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque caller identity (wallet address, principal, account name).
///
/// Authentication happens outside the evaluator; the string is trusted.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    bincode::Encode,
    bincode::Decode,
)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A validated score in `0..=100`.
///
/// Out-of-range input is rejected, never clamped.
///
/// # Examples
///
/// ```
/// use dace_core::types::Score;
///
/// assert_eq!(Score::new(100).unwrap().get(), 100);
/// assert!(Score::new(101).is_err());
/// assert!(Score::new(-1).is_err());
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
    bincode::Encode,
    bincode::Decode,
)]
pub struct Score(u8);

impl Score {
    pub const ZERO: Self = Self(MIN_SCORE);
    pub const MAX: Self = Self(MAX_SCORE);
    /// Transparency score of a newly registered charity.
    pub const DEFAULT_TRANSPARENCY: Self = Self(DEFAULT_TRANSPARENCY_SCORE);

    /// Validate a raw score.
    pub fn new(value: i64) -> Result<Self, EvaluatorError> {
        if value < MIN_SCORE as i64 || value > MAX_SCORE as i64 {
            return Err(EvaluatorError::InvalidScore(value));
        }
        Ok(Self(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = EvaluatorError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered charity.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Charity {
    pub id: CharityId,
    pub name: String,
    pub description: String,
    /// Identity that registered the charity and controls it.
    pub owner: Identity,
    /// Sum of every donation amount ever recorded for this charity.
    pub total_donations: u64,
    /// Governance-controlled trust metric.
    pub transparency_score: Score,
}

/// The live donation record for one (charity, donor) pair.
///
/// A later donation overwrites `amount` and `timestamp`; the charity total
/// keeps the full history.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Donation {
    pub charity_id: CharityId,
    pub donor: Identity,
    pub amount: u64,
    pub timestamp: u64,
}

/// Administrator-assigned impact score for a charity.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct ImpactScore {
    pub charity_id: CharityId,
    pub score: Score,
    pub last_updated: u64,
}

/// A donor's vote on a charity's impact.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Vote {
    pub charity_id: CharityId,
    pub donor: Identity,
    pub score: Score,
    /// Donor's donation amount when the vote was cast.
    pub weight: u64,
    pub cast_at: u64,
}

/// Aggregate of every live vote on a single charity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    bincode::Encode,
    bincode::Decode,
)]
pub struct VoteTally {
    pub votes: u64,
    pub total_weight: u64,
    /// `sum(score * weight)`, widened so large stakes cannot overflow.
    pub weighted_score_sum: u128,
}

impl VoteTally {
    /// Weight-averaged vote score, floored. `None` when nothing carries weight.
    ///
    /// # Examples
    ///
    /// ```
    /// use dace_core::types::VoteTally;
    ///
    /// let tally = VoteTally { votes: 2, total_weight: 4, weighted_score_sum: 90 * 3 + 50 };
    /// assert_eq!(tally.weighted_average(), Some(80));
    /// assert_eq!(VoteTally::default().weighted_average(), None);
    /// ```
    pub fn weighted_average(&self) -> Option<u8> {
        if self.total_weight == 0 {
            return None;
        }
        Some((self.weighted_score_sum / self.total_weight as u128) as u8)
    }
}

/// Outcome of one incentive distribution round.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Distribution {
    /// 1-based round counter.
    pub round: u64,
    pub pool_size: u64,
    /// Sum of every charity's combined score this round.
    pub total_score: u64,
    /// Allocation per registered charity, including zero allocations.
    pub allocations: BTreeMap<CharityId, u64>,
    /// Sum of all allocations.
    pub distributed: u64,
    /// Rounding loss from floor division. Never redistributed.
    pub remainder: u64,
}

impl Distribution {
    pub fn allocation(&self, id: CharityId) -> Option<u64> {
        self.allocations.get(&id).copied()
    }
}
