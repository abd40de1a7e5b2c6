//! Incentive distribution.
//!
//! Splits a fixed pool among registered charities in proportion to their
//! combined score:
//!
//! ```text
//! allocation(c) = floor(pool_size * combined(c) / sum(combined))
//! ```
//!
//! All arithmetic is integer-only. The product `pool_size * combined` is
//! formed in `u128` before dividing, so no intermediate can overflow and the
//! result is bit-identical on every platform. Since `combined(c) <= total`,
//! each allocation fits back into `u64`.
//!
//! Floor division leaves `pool_size - sum(allocations)` undistributed. That
//! remainder is reported on the [`Distribution`] and is never handed out;
//! it is strictly less than the number of charities with a positive score.

use std::collections::BTreeMap;

use crate::error::EvaluatorError;
use crate::impact::ImpactScores;
use crate::registry::CharityRegistry;
use crate::traits::{CharityScoreInputs, ScoringPolicy};
use crate::types::{CharityId, Distribution};
use crate::voting::VoteBook;

/// Combined score of every registered charity, in identifier order.
///
/// Impact scores for identifiers outside the registry are ignored.
pub fn combined_scores(
    registry: &CharityRegistry,
    impact: &ImpactScores,
    votes: &VoteBook,
    policy: &dyn ScoringPolicy,
) -> Vec<(CharityId, u64)> {
    registry
        .iter()
        .map(|charity| {
            let inputs = CharityScoreInputs {
                charity,
                impact_score: impact.score(charity.id),
                votes: votes.tally(charity.id),
            };
            (charity.id, policy.combined_score(&inputs))
        })
        .collect()
}

/// Allocate `pool_size` proportionally to `scores`.
///
/// # Errors
///
/// - [`EvaluatorError::InvalidPoolSize`] if `pool_size` is zero
/// - [`EvaluatorError::ArithmeticOverflow`] if the scores sum past `u64::MAX`
/// - [`EvaluatorError::DegenerateRound`] if every score is zero (or there are none)
///
/// # Examples
///
/// ```
/// use dace_core::distribution::allocate;
/// use dace_core::types::CharityId;
///
/// let d = allocate(1_000_000, 1, &[(CharityId(0), 8_000), (CharityId(1), 6_000)]).unwrap();
/// assert_eq!(d.allocation(CharityId(0)), Some(571_428));
/// assert_eq!(d.allocation(CharityId(1)), Some(428_571));
/// assert_eq!(d.remainder, 1);
/// ```
pub fn allocate(
    pool_size: u64,
    round: u64,
    scores: &[(CharityId, u64)],
) -> Result<Distribution, EvaluatorError> {
    if pool_size == 0 {
        return Err(EvaluatorError::InvalidPoolSize(pool_size));
    }

    let total_score = scores
        .iter()
        .try_fold(0u64, |acc, &(_, score)| acc.checked_add(score))
        .ok_or(EvaluatorError::ArithmeticOverflow)?;
    if total_score == 0 {
        return Err(EvaluatorError::DegenerateRound);
    }

    let mut allocations = BTreeMap::new();
    let mut distributed: u64 = 0;
    for &(id, score) in scores {
        // score <= total_score, so the quotient is <= pool_size.
        let amount = (pool_size as u128 * score as u128 / total_score as u128) as u64;
        distributed = distributed
            .checked_add(amount)
            .ok_or(EvaluatorError::ArithmeticOverflow)?;
        allocations.insert(id, amount);
    }

    Ok(Distribution {
        round,
        pool_size,
        total_score,
        allocations,
        distributed,
        remainder: pool_size - distributed,
    })
}

/// Score every registered charity with `policy` and allocate the pool.
pub fn distribute(
    registry: &CharityRegistry,
    impact: &ImpactScores,
    votes: &VoteBook,
    policy: &dyn ScoringPolicy,
    pool_size: u64,
    round: u64,
) -> Result<Distribution, EvaluatorError> {
    let scores = combined_scores(registry, impact, votes, policy);
    allocate(pool_size, round, &scores)
}
