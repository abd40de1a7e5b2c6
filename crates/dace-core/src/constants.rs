//! Evaluator constants. All amounts are integer units of the host's currency.

/// Highest accepted impact, transparency, or vote score (inclusive).
pub const MAX_SCORE: u8 = 100;

/// Lowest accepted score (inclusive).
pub const MIN_SCORE: u8 = 0;

/// Transparency score assigned to every newly registered charity.
pub const DEFAULT_TRANSPARENCY_SCORE: u8 = MAX_SCORE;

/// Incentive pool used when the host does not configure one.
///
/// # Examples
///
/// ```
/// use dace_core::constants::DEFAULT_INCENTIVE_POOL;
/// assert_eq!(DEFAULT_INCENTIVE_POOL, 1_000_000);
/// ```
pub const DEFAULT_INCENTIVE_POOL: u64 = 1_000_000;

/// Largest combined score a single charity can reach under the default
/// impact × transparency policy (`100 * 100`).
pub const MAX_COMBINED_SCORE: u64 = (MAX_SCORE as u64) * (MAX_SCORE as u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bounds_are_inclusive_percent() {
        assert_eq!(MIN_SCORE, 0);
        assert_eq!(MAX_SCORE, 100);
    }

    #[test]
    fn new_charities_start_fully_transparent() {
        assert_eq!(DEFAULT_TRANSPARENCY_SCORE, MAX_SCORE);
    }

    #[test]
    fn max_combined_score_is_ten_thousand() {
        assert_eq!(MAX_COMBINED_SCORE, 10_000);
    }
}
