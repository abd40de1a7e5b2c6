//! The complete evaluator state and its transitions.
//!
//! [`EvaluatorState`] owns the four stores plus the last distribution.
//! Every mutating operation is split in two:
//!
//! 1. `prepare_*` (takes `&self`) validates the request and returns a
//!    [`StateChange`] describing exactly what will be written. It never
//!    mutates, so a rejected request has no side effects.
//! 2. [`apply`](EvaluatorState::apply) (takes `&mut self`) commits a change
//!    and cannot fail.
//!
//! A host that persists state writes the change durably between the two
//! steps. Hosts without persistence use the one-shot helpers
//! (`register`, `record_donation`, …) which prepare and apply together.
//!
//! A change must be applied to the same state it was prepared against.
//! Hold exclusive access across both steps.

use crate::distribution;
use crate::error::EvaluatorError;
use crate::impact::ImpactScores;
use crate::ledger::DonationLedger;
use crate::registry::CharityRegistry;
use crate::traits::{ImpactTransparency, ScoringPolicy};
use crate::types::{
    Charity, CharityId, Distribution, Donation, Identity, ImpactScore, Score, Vote, VoteTally,
};
use crate::voting::VoteBook;

/// A validated mutation, ready to persist and apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    CharityRegistered(Charity),
    DonationRecorded {
        donation: Donation,
        /// The charity's accumulated total after this donation.
        charity_total: u64,
    },
    VoteCast(Vote),
    ImpactScoreSet(ImpactScore),
    TransparencyScoreSet {
        charity_id: CharityId,
        score: Score,
    },
    IncentivesDistributed(Distribution),
}

impl StateChange {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CharityRegistered(_) => "charity_registered",
            Self::DonationRecorded { .. } => "donation_recorded",
            Self::VoteCast(_) => "vote_cast",
            Self::ImpactScoreSet(_) => "impact_score_set",
            Self::TransparencyScoreSet { .. } => "transparency_score_set",
            Self::IncentivesDistributed(_) => "incentives_distributed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluatorState {
    registry: CharityRegistry,
    ledger: DonationLedger,
    votes: VoteBook,
    impact: ImpactScores,
    last_distribution: Option<Distribution>,
}

impl EvaluatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a state from already-built stores (e.g. loaded from disk).
    pub fn from_parts(
        registry: CharityRegistry,
        ledger: DonationLedger,
        votes: VoteBook,
        impact: ImpactScores,
        last_distribution: Option<Distribution>,
    ) -> Self {
        Self {
            registry,
            ledger,
            votes,
            impact,
            last_distribution,
        }
    }

    // ------------------------------------------------------------------
    // Prepare
    // ------------------------------------------------------------------

    pub fn prepare_registration(
        &self,
        name: &str,
        description: &str,
        owner: &Identity,
    ) -> StateChange {
        StateChange::CharityRegistered(self.registry.new_charity(name, description, owner))
    }

    pub fn prepare_donation(
        &self,
        charity_id: CharityId,
        amount: u64,
        donor: &Identity,
        timestamp: u64,
    ) -> Result<StateChange, EvaluatorError> {
        let pending = self
            .ledger
            .prepare(&self.registry, charity_id, amount, donor, timestamp)?;
        Ok(StateChange::DonationRecorded {
            donation: pending.donation,
            charity_total: pending.charity_total,
        })
    }

    pub fn prepare_vote(
        &self,
        charity_id: CharityId,
        score: i64,
        donor: &Identity,
        timestamp: u64,
    ) -> Result<StateChange, EvaluatorError> {
        self.votes
            .prepare(&self.ledger, charity_id, score, donor, timestamp)
            .map(StateChange::VoteCast)
    }

    pub fn prepare_impact_score(
        &self,
        charity_id: CharityId,
        score: i64,
        timestamp: u64,
    ) -> Result<StateChange, EvaluatorError> {
        self.impact
            .prepare(charity_id, score, timestamp)
            .map(StateChange::ImpactScoreSet)
    }

    /// Governance update of a charity's transparency score.
    ///
    /// The score is validated before the charity lookup.
    pub fn prepare_transparency_score(
        &self,
        charity_id: CharityId,
        score: i64,
    ) -> Result<StateChange, EvaluatorError> {
        let score = Score::new(score)?;
        self.registry.require(charity_id)?;
        Ok(StateChange::TransparencyScoreSet { charity_id, score })
    }

    /// Compute a distribution round with the default impact × transparency
    /// policy.
    pub fn prepare_distribution(&self, pool_size: u64) -> Result<StateChange, EvaluatorError> {
        self.prepare_distribution_with(&ImpactTransparency, pool_size)
    }

    pub fn prepare_distribution_with(
        &self,
        policy: &dyn ScoringPolicy,
        pool_size: u64,
    ) -> Result<StateChange, EvaluatorError> {
        distribution::distribute(
            &self.registry,
            &self.impact,
            &self.votes,
            policy,
            pool_size,
            self.rounds_completed() + 1,
        )
        .map(StateChange::IncentivesDistributed)
    }

    // ------------------------------------------------------------------
    // Apply
    // ------------------------------------------------------------------

    /// Commit a change produced by one of the `prepare_*` methods.
    pub fn apply(&mut self, change: StateChange) {
        match change {
            StateChange::CharityRegistered(charity) => self.registry.insert(charity),
            StateChange::DonationRecorded {
                donation,
                charity_total,
            } => {
                self.registry
                    .set_total_donations(donation.charity_id, charity_total);
                self.ledger.insert(donation);
            }
            StateChange::VoteCast(vote) => self.votes.insert(vote),
            StateChange::ImpactScoreSet(record) => self.impact.insert(record),
            StateChange::TransparencyScoreSet { charity_id, score } => {
                self.registry.set_transparency_score(charity_id, score)
            }
            StateChange::IncentivesDistributed(distribution) => {
                self.last_distribution = Some(distribution)
            }
        }
    }

    // ------------------------------------------------------------------
    // One-shot operations
    // ------------------------------------------------------------------

    /// Register a charity. Always succeeds.
    pub fn register(&mut self, name: &str, description: &str, owner: &Identity) -> CharityId {
        let change = self.prepare_registration(name, description, owner);
        let id = self.registry.next_id();
        self.apply(change);
        id
    }

    pub fn record_donation(
        &mut self,
        charity_id: CharityId,
        amount: u64,
        donor: &Identity,
        timestamp: u64,
    ) -> Result<(), EvaluatorError> {
        let change = self.prepare_donation(charity_id, amount, donor, timestamp)?;
        self.apply(change);
        Ok(())
    }

    pub fn cast_vote(
        &mut self,
        charity_id: CharityId,
        score: i64,
        donor: &Identity,
        timestamp: u64,
    ) -> Result<(), EvaluatorError> {
        let change = self.prepare_vote(charity_id, score, donor, timestamp)?;
        self.apply(change);
        Ok(())
    }

    pub fn set_impact_score(
        &mut self,
        charity_id: CharityId,
        score: i64,
        timestamp: u64,
    ) -> Result<(), EvaluatorError> {
        let change = self.prepare_impact_score(charity_id, score, timestamp)?;
        self.apply(change);
        Ok(())
    }

    pub fn set_transparency_score(
        &mut self,
        charity_id: CharityId,
        score: i64,
    ) -> Result<(), EvaluatorError> {
        let change = self.prepare_transparency_score(charity_id, score)?;
        self.apply(change);
        Ok(())
    }

    /// Run a distribution round and keep it as the latest result.
    ///
    /// A degenerate round returns an error and leaves the previous result
    /// in place.
    pub fn distribute(&mut self, pool_size: u64) -> Result<Distribution, EvaluatorError> {
        self.distribute_with(&ImpactTransparency, pool_size)
    }

    pub fn distribute_with(
        &mut self,
        policy: &dyn ScoringPolicy,
        pool_size: u64,
    ) -> Result<Distribution, EvaluatorError> {
        let round = distribution::distribute(
            &self.registry,
            &self.impact,
            &self.votes,
            policy,
            pool_size,
            self.rounds_completed() + 1,
        )?;
        self.apply(StateChange::IncentivesDistributed(round.clone()));
        Ok(round)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn get_charity(&self, charity_id: CharityId) -> Option<&Charity> {
        self.registry.get(charity_id)
    }

    pub fn get_donation(&self, charity_id: CharityId, donor: &Identity) -> Option<&Donation> {
        self.ledger.get(charity_id, donor)
    }

    /// Fails with [`EvaluatorError::NotFound`] for an unregistered charity.
    pub fn get_total_donations(&self, charity_id: CharityId) -> Result<u64, EvaluatorError> {
        self.registry.total_donations(charity_id)
    }

    pub fn get_impact_score(&self, charity_id: CharityId) -> Option<&ImpactScore> {
        self.impact.get(charity_id)
    }

    pub fn get_vote(&self, charity_id: CharityId, donor: &Identity) -> Option<&Vote> {
        self.votes.get(charity_id, donor)
    }

    pub fn vote_tally(&self, charity_id: CharityId) -> VoteTally {
        self.votes.tally(charity_id)
    }

    /// Allocation from the most recent successful round.
    pub fn get_incentive(&self, charity_id: CharityId) -> Option<u64> {
        self.last_distribution.as_ref()?.allocation(charity_id)
    }

    pub fn last_distribution(&self) -> Option<&Distribution> {
        self.last_distribution.as_ref()
    }

    pub fn rounds_completed(&self) -> u64 {
        self.last_distribution.as_ref().map_or(0, |d| d.round)
    }

    pub fn charity_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &CharityRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &DonationLedger {
        &self.ledger
    }

    pub fn votes(&self) -> &VoteBook {
        &self.votes
    }

    pub fn impact_scores(&self) -> &ImpactScores {
        &self.impact
    }
}
