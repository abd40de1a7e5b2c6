//! Donation ledger.
//!
//! Keeps the live [`Donation`] record per (charity, donor). A repeat donation
//! from the same donor overwrites the record's amount and timestamp, while
//! the charity's registry total is credited with the new amount only. The
//! registry total therefore always equals the sum of every donation ever
//! recorded, whatever the per-donor record currently holds.

use std::collections::BTreeMap;

use crate::error::EvaluatorError;
use crate::registry::CharityRegistry;
use crate::types::{CharityId, Donation, Identity};

/// A validated donation and the charity total it produces once applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDonation {
    pub donation: Donation,
    pub charity_total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationLedger {
    records: BTreeMap<CharityId, BTreeMap<Identity, Donation>>,
}

impl DonationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records. Later duplicates replace earlier ones.
    pub fn from_records(donations: impl IntoIterator<Item = Donation>) -> Self {
        let mut ledger = Self::new();
        for donation in donations {
            ledger.insert(donation);
        }
        ledger
    }

    /// Validate a donation against the registry without mutating anything.
    ///
    /// # Errors
    ///
    /// - [`EvaluatorError::NotFound`] if the charity is not registered
    /// - [`EvaluatorError::InvalidAmount`] if `amount` is zero
    /// - [`EvaluatorError::ArithmeticOverflow`] if the charity total would overflow
    pub fn prepare(
        &self,
        registry: &CharityRegistry,
        charity_id: CharityId,
        amount: u64,
        donor: &Identity,
        timestamp: u64,
    ) -> Result<PendingDonation, EvaluatorError> {
        registry.require(charity_id)?;
        if amount == 0 {
            return Err(EvaluatorError::InvalidAmount(amount));
        }
        let charity_total = registry.credited_total(charity_id, amount)?;

        Ok(PendingDonation {
            donation: Donation {
                charity_id,
                donor: donor.clone(),
                amount,
                timestamp,
            },
            charity_total,
        })
    }

    /// Store a donation record, replacing any previous one for the same pair.
    pub(crate) fn insert(&mut self, donation: Donation) {
        self.records
            .entry(donation.charity_id)
            .or_default()
            .insert(donation.donor.clone(), donation);
    }

    pub fn get(&self, charity_id: CharityId, donor: &Identity) -> Option<&Donation> {
        self.records.get(&charity_id)?.get(donor)
    }

    /// Live donation records for one charity, ordered by donor.
    pub fn donations_for(&self, charity_id: CharityId) -> impl Iterator<Item = &Donation> {
        self.records
            .get(&charity_id)
            .into_iter()
            .flat_map(|by_donor| by_donor.values())
    }

    /// Every live record, ordered by (charity, donor).
    pub fn iter(&self) -> impl Iterator<Item = &Donation> {
        self.records.values().flat_map(|by_donor| by_donor.values())
    }

    /// Number of live (charity, donor) records.
    pub fn len(&self) -> usize {
        self.records.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
