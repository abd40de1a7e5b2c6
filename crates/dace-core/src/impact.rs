//! Administrator-assigned impact scores, one live value per charity.
//!
//! The store does not consult the registry. A score recorded for an
//! identifier that is not registered is kept but never enters a
//! distribution round.

use std::collections::BTreeMap;

use crate::error::EvaluatorError;
use crate::types::{CharityId, ImpactScore, Score};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactScores {
    scores: BTreeMap<CharityId, ImpactScore>,
}

impl ImpactScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = ImpactScore>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Validate a score update. Fails only with [`EvaluatorError::InvalidScore`].
    pub fn prepare(
        &self,
        charity_id: CharityId,
        score: i64,
        timestamp: u64,
    ) -> Result<ImpactScore, EvaluatorError> {
        Ok(ImpactScore {
            charity_id,
            score: Score::new(score)?,
            last_updated: timestamp,
        })
    }

    /// Overwrite the charity's score unconditionally.
    pub(crate) fn insert(&mut self, record: ImpactScore) {
        self.scores.insert(record.charity_id, record);
    }

    pub fn get(&self, charity_id: CharityId) -> Option<&ImpactScore> {
        self.scores.get(&charity_id)
    }

    pub fn score(&self, charity_id: CharityId) -> Option<Score> {
        self.get(charity_id).map(|r| r.score)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImpactScore> {
        self.scores.values()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
