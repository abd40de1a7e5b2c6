//! Error types for the charity evaluator.
use thiserror::Error;

use crate::types::{CharityId, Identity};

/// Every way an evaluator operation can be rejected.
///
/// A rejected operation never mutates state: all checks run before any store
/// is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluatorError {
    #[error("charity not found: {0}")] NotFound(CharityId),
    #[error("invalid score: {0} (expected 0..=100)")] InvalidScore(i64),
    #[error("invalid donation amount: {0}")] InvalidAmount(u64),
    #[error("no donation from {donor} to charity {charity_id}")] NoDonationFound { charity_id: CharityId, donor: Identity },
    #[error("degenerate round: total combined score is zero")] DegenerateRound,
    #[error("invalid pool size: {0}")] InvalidPoolSize(u64),
    #[error("arithmetic overflow")] ArithmeticOverflow,
}
