//! # dace-core
//! Foundation types, stores, and incentive math for the charity evaluator.
//!
//! All calculations use integer arithmetic only for determinism. The crate
//! performs no I/O; persistence and locking live in `dace-node`.

pub mod clock;
pub mod constants;
pub mod distribution;
pub mod error;
pub mod impact;
pub mod ledger;
pub mod registry;
pub mod state;
pub mod traits;
pub mod types;
pub mod voting;

pub use error::EvaluatorError;
pub use state::{EvaluatorState, StateChange};
pub use traits::{Clock, ImpactTransparency, ScoringPolicy};
pub use types::{
    Charity, CharityId, Distribution, Donation, Identity, ImpactScore, Score, Vote, VoteTally,
};
