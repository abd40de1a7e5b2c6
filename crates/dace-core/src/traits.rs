//! Trait seams between the evaluator core and its host.
//!
//! - [`Clock`] — monotonic timestamp source (host provides; see [`crate::clock`])
//! - [`ScoringPolicy`] — how a charity's combined score is derived for a
//!   distribution round (default: [`ImpactTransparency`])

use crate::types::{Charity, Score, VoteTally};

/// Source of monotonic timestamps for donation, vote, and impact records.
pub trait Clock: Send + Sync {
    /// Current timestamp. Successive calls never go backwards.
    fn now(&self) -> u64;
}

/// Everything a [`ScoringPolicy`] may consult for one charity.
#[derive(Debug, Clone, Copy)]
pub struct CharityScoreInputs<'a> {
    pub charity: &'a Charity,
    /// `None` when no impact score has been recorded.
    pub impact_score: Option<Score>,
    /// Aggregate of the charity's live votes.
    pub votes: VoteTally,
}

/// Maps a charity's scores to the combined score used for proportional
/// allocation.
///
/// Implementations must be pure: the same inputs always give the same score.
pub trait ScoringPolicy: Send + Sync {
    fn combined_score(&self, inputs: &CharityScoreInputs<'_>) -> u64;
}

/// `impact_score * transparency_score`, with a missing impact score counted
/// as zero. Votes are ignored.
///
/// # Examples
///
/// ```
/// use dace_core::traits::{CharityScoreInputs, ImpactTransparency, ScoringPolicy};
/// use dace_core::types::{Charity, CharityId, Identity, Score, VoteTally};
///
/// let charity = Charity {
///     id: CharityId(0),
///     name: "A".into(),
///     description: String::new(),
///     owner: Identity::new("wallet"),
///     total_donations: 0,
///     transparency_score: Score::MAX,
/// };
/// let inputs = CharityScoreInputs {
///     charity: &charity,
///     impact_score: Some(Score::new(80).unwrap()),
///     votes: VoteTally::default(),
/// };
/// assert_eq!(ImpactTransparency.combined_score(&inputs), 8_000);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactTransparency;

impl ScoringPolicy for ImpactTransparency {
    fn combined_score(&self, inputs: &CharityScoreInputs<'_>) -> u64 {
        let impact = inputs.impact_score.map_or(0, |s| s.get() as u64);
        impact * inputs.charity.transparency_score.get() as u64
    }
}
