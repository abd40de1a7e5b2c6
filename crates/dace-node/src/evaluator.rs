//! Evaluator service composition.
//!
//! The [`Evaluator`] wraps an [`EvaluatorState`] in a single `RwLock` and
//! optionally backs it with a [`RocksStore`]. Every mutation takes the write
//! lock for its whole prepare → persist → apply sequence, so no reader ever
//! observes a half-applied transition. [`distribute`](Evaluator::distribute)
//! computes its round under the same write lock and therefore reads one
//! consistent snapshot of all four stores.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use dace_core::clock::SystemClock;
use dace_core::distribution;
use dace_core::error::EvaluatorError;
use dace_core::state::{EvaluatorState, StateChange};
use dace_core::traits::{Clock, ImpactTransparency, ScoringPolicy};
use dace_core::types::{
    Charity, CharityId, Distribution, Donation, Identity, ImpactScore, Vote, VoteTally,
};

use crate::config::EvaluatorConfig;
use crate::error::NodeError;
use crate::storage::RocksStore;

/// Shareable evaluator: state, optional durable store, and clock.
pub struct Evaluator {
    /// In-memory state behind a read-write lock.
    state: RwLock<EvaluatorState>,
    /// Durable store (None for an in-memory evaluator).
    store: Option<RocksStore>,
    /// Timestamp source for donations, votes, and impact updates.
    clock: Arc<dyn Clock>,
    /// Service configuration.
    config: EvaluatorConfig,
}

impl Evaluator {
    /// Open the store at `config.db_path()`, load its state, and use the
    /// system clock.
    pub fn open(config: EvaluatorConfig) -> Result<Arc<Self>, NodeError> {
        Self::open_with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Open with a caller-supplied clock.
    pub fn open_with_clock(
        config: EvaluatorConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<Self>, NodeError> {
        let store = RocksStore::open(config.db_path())?;
        let state = store.load_state()?;

        info!(
            charities = state.charity_count(),
            rounds = state.rounds_completed(),
            "evaluator opened"
        );

        Ok(Arc::new(Self {
            state: RwLock::new(state),
            store: Some(store),
            clock,
            config,
        }))
    }

    /// Create an evaluator without persistence (for testing and embedding).
    pub fn in_memory(config: EvaluatorConfig, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(EvaluatorState::new()),
            store: None,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Persist `change` (if a store is attached) and then apply it.
    ///
    /// Must be called with the write lock held on `state`.
    fn commit(&self, state: &mut EvaluatorState, change: StateChange) -> Result<(), NodeError> {
        if let Some(store) = &self.store {
            store.commit(&change)?;
        }
        debug!(kind = change.kind(), "state change applied");
        state.apply(change);
        Ok(())
    }

    /// Log a rejected request and convert it for the caller.
    fn rejected(op: &'static str, err: EvaluatorError) -> NodeError {
        debug!(op, error = %err, "request rejected");
        NodeError::Evaluator(err)
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Register a charity owned by `owner` and return its identifier.
    pub fn register(
        &self,
        name: &str,
        description: &str,
        owner: &Identity,
    ) -> Result<CharityId, NodeError> {
        let mut state = self.state.write();
        let id = state.registry().next_id();
        let change = state.prepare_registration(name, description, owner);
        self.commit(&mut state, change)?;
        info!(charity_id = %id, name, owner = %owner, "charity registered");
        Ok(id)
    }

    pub fn record_donation(
        &self,
        charity_id: CharityId,
        amount: u64,
        donor: &Identity,
    ) -> Result<(), NodeError> {
        let mut state = self.state.write();
        let change = state
            .prepare_donation(charity_id, amount, donor, self.clock.now())
            .map_err(|e| Self::rejected("record_donation", e))?;
        self.commit(&mut state, change)?;
        info!(charity_id = %charity_id, amount, donor = %donor, "donation recorded");
        Ok(())
    }

    pub fn cast_vote(
        &self,
        charity_id: CharityId,
        score: i64,
        donor: &Identity,
    ) -> Result<(), NodeError> {
        let mut state = self.state.write();
        let change = state
            .prepare_vote(charity_id, score, donor, self.clock.now())
            .map_err(|e| Self::rejected("cast_vote", e))?;
        self.commit(&mut state, change)?;
        info!(charity_id = %charity_id, score, donor = %donor, "vote cast");
        Ok(())
    }

    pub fn set_impact_score(&self, charity_id: CharityId, score: i64) -> Result<(), NodeError> {
        let mut state = self.state.write();
        let change = state
            .prepare_impact_score(charity_id, score, self.clock.now())
            .map_err(|e| Self::rejected("set_impact_score", e))?;
        if !state.registry().contains(charity_id) {
            warn!(charity_id = %charity_id, "impact score set for unregistered charity");
        }
        self.commit(&mut state, change)?;
        info!(charity_id = %charity_id, score, "impact score updated");
        Ok(())
    }

    /// Governance update of a charity's transparency score.
    pub fn set_transparency_score(
        &self,
        charity_id: CharityId,
        score: i64,
    ) -> Result<(), NodeError> {
        let mut state = self.state.write();
        let change = state
            .prepare_transparency_score(charity_id, score)
            .map_err(|e| Self::rejected("set_transparency_score", e))?;
        self.commit(&mut state, change)?;
        info!(charity_id = %charity_id, score, "transparency score updated");
        Ok(())
    }

    /// Distribute `pool_size` with the default impact × transparency policy.
    pub fn distribute(&self, pool_size: u64) -> Result<Distribution, NodeError> {
        self.distribute_with(&ImpactTransparency, pool_size)
    }

    /// Distribute the configured default pool.
    pub fn distribute_default(&self) -> Result<Distribution, NodeError> {
        self.distribute(self.config.default_pool_size)
    }

    /// Distribute with a caller-supplied scoring policy.
    ///
    /// A degenerate round is reported and leaves the previous round's
    /// allocations in place.
    pub fn distribute_with(
        &self,
        policy: &dyn ScoringPolicy,
        pool_size: u64,
    ) -> Result<Distribution, NodeError> {
        let mut state = self.state.write();
        let round = match distribution::distribute(
            state.registry(),
            state.impact_scores(),
            state.votes(),
            policy,
            pool_size,
            state.rounds_completed() + 1,
        ) {
            Ok(round) => round,
            Err(EvaluatorError::DegenerateRound) => {
                warn!(
                    pool_size,
                    charities = state.charity_count(),
                    "degenerate round: no charity has a positive combined score"
                );
                return Err(NodeError::Evaluator(EvaluatorError::DegenerateRound));
            }
            Err(e) => return Err(Self::rejected("distribute", e)),
        };
        self.commit(&mut state, StateChange::IncentivesDistributed(round.clone()))?;

        info!(
            round = round.round,
            pool_size,
            total_score = round.total_score,
            distributed = round.distributed,
            remainder = round.remainder,
            "incentives distributed"
        );
        Ok(round)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn get_charity(&self, charity_id: CharityId) -> Option<Charity> {
        self.state.read().get_charity(charity_id).cloned()
    }

    pub fn get_donation(&self, charity_id: CharityId, donor: &Identity) -> Option<Donation> {
        self.state.read().get_donation(charity_id, donor).cloned()
    }

    pub fn get_total_donations(&self, charity_id: CharityId) -> Result<u64, EvaluatorError> {
        self.state.read().get_total_donations(charity_id)
    }

    pub fn get_impact_score(&self, charity_id: CharityId) -> Option<ImpactScore> {
        self.state.read().get_impact_score(charity_id).cloned()
    }

    pub fn get_vote(&self, charity_id: CharityId, donor: &Identity) -> Option<Vote> {
        self.state.read().get_vote(charity_id, donor).cloned()
    }

    pub fn vote_tally(&self, charity_id: CharityId) -> VoteTally {
        self.state.read().vote_tally(charity_id)
    }

    pub fn get_incentive(&self, charity_id: CharityId) -> Option<u64> {
        self.state.read().get_incentive(charity_id)
    }

    pub fn last_distribution(&self) -> Option<Distribution> {
        self.state.read().last_distribution().cloned()
    }

    pub fn charity_count(&self) -> usize {
        self.state.read().charity_count()
    }

    /// Point-in-time copy of the whole state.
    pub fn snapshot(&self) -> EvaluatorState {
        self.state.read().clone()
    }
}
