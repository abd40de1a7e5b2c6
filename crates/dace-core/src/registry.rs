//! Charity registry.
//!
//! Owns every [`Charity`] record. Identifiers are the index into a dense
//! vector, so they are zero-based, sequential, and never reused. Charities
//! are never removed.

use crate::error::EvaluatorError;
use crate::types::{Charity, CharityId, Identity, Score};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharityRegistry {
    charities: Vec<Charity>,
}

impl CharityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted records.
    ///
    /// Records must be sorted by id and dense from zero; anything else is
    /// reported as the first missing id.
    pub fn from_records(charities: Vec<Charity>) -> Result<Self, EvaluatorError> {
        for (index, charity) in charities.iter().enumerate() {
            if charity.id.0 != index as u64 {
                return Err(EvaluatorError::NotFound(CharityId(index as u64)));
            }
        }
        Ok(Self { charities })
    }

    /// The identifier the next registration will receive.
    pub fn next_id(&self) -> CharityId {
        CharityId(self.charities.len() as u64)
    }

    /// Build the record for a new charity without inserting it.
    pub fn new_charity(&self, name: &str, description: &str, owner: &Identity) -> Charity {
        Charity {
            id: self.next_id(),
            name: name.to_owned(),
            description: description.to_owned(),
            owner: owner.clone(),
            total_donations: 0,
            transparency_score: Score::DEFAULT_TRANSPARENCY,
        }
    }

    /// Append a record built by [`new_charity`](Self::new_charity).
    ///
    /// The record's id must equal [`next_id`](Self::next_id).
    pub(crate) fn insert(&mut self, charity: Charity) {
        debug_assert_eq!(charity.id, self.next_id(), "registry ids must stay dense");
        self.charities.push(charity);
    }

    /// Register a charity and return its identifier. Always succeeds.
    pub fn register(&mut self, name: &str, description: &str, owner: &Identity) -> CharityId {
        let charity = self.new_charity(name, description, owner);
        let id = charity.id;
        self.insert(charity);
        id
    }

    pub fn get(&self, id: CharityId) -> Option<&Charity> {
        usize::try_from(id.0).ok().and_then(|i| self.charities.get(i))
    }

    fn get_mut(&mut self, id: CharityId) -> Option<&mut Charity> {
        usize::try_from(id.0).ok().and_then(|i| self.charities.get_mut(i))
    }

    /// Look up a charity, failing with [`EvaluatorError::NotFound`].
    pub fn require(&self, id: CharityId) -> Result<&Charity, EvaluatorError> {
        self.get(id).ok_or(EvaluatorError::NotFound(id))
    }

    pub fn contains(&self, id: CharityId) -> bool {
        self.get(id).is_some()
    }

    /// Accumulated donation total for a registered charity.
    pub fn total_donations(&self, id: CharityId) -> Result<u64, EvaluatorError> {
        Ok(self.require(id)?.total_donations)
    }

    /// Total after adding `amount`, without mutating anything.
    pub fn credited_total(&self, id: CharityId, amount: u64) -> Result<u64, EvaluatorError> {
        self.require(id)?
            .total_donations
            .checked_add(amount)
            .ok_or(EvaluatorError::ArithmeticOverflow)
    }

    /// Overwrite the accumulated total with a value from
    /// [`credited_total`](Self::credited_total).
    pub(crate) fn set_total_donations(&mut self, id: CharityId, total: u64) {
        if let Some(charity) = self.get_mut(id) {
            debug_assert!(total >= charity.total_donations, "totals never decrease");
            charity.total_donations = total;
        }
    }

    pub(crate) fn set_transparency_score(&mut self, id: CharityId, score: Score) {
        if let Some(charity) = self.get_mut(id) {
            charity.transparency_score = score;
        }
    }

    pub fn len(&self) -> usize {
        self.charities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charities.is_empty()
    }

    /// All charities in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Charity> {
        self.charities.iter()
    }
}
