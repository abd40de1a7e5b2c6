//! Donation-weighted impact voting.
//!
//! A donor may vote on a charity only after donating to it. The vote's
//! weight is a snapshot of the donor's live donation amount at cast time,
//! so a vote cast before a later donation keeps its old weight until the
//! donor votes again. Re-casting replaces both score and weight.
//!
//! Votes are aggregated by [`VoteBook::tally`] and handed to the
//! [`ScoringPolicy`](crate::traits::ScoringPolicy) during distribution; the
//! default policy does not use them.

use std::collections::BTreeMap;

use crate::error::EvaluatorError;
use crate::ledger::DonationLedger;
use crate::types::{CharityId, Identity, Score, Vote, VoteTally};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteBook {
    votes: BTreeMap<CharityId, BTreeMap<Identity, Vote>>,
}

impl VoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records. Later duplicates replace earlier ones.
    pub fn from_records(votes: impl IntoIterator<Item = Vote>) -> Self {
        let mut book = Self::new();
        for vote in votes {
            book.insert(vote);
        }
        book
    }

    /// Validate a vote without mutating anything.
    ///
    /// The score is checked first, then eligibility. An unregistered charity
    /// has no donations, so it fails eligibility too.
    ///
    /// # Errors
    ///
    /// - [`EvaluatorError::InvalidScore`] if `score` is outside `0..=100`
    /// - [`EvaluatorError::NoDonationFound`] if `donor` never donated to the charity
    pub fn prepare(
        &self,
        ledger: &DonationLedger,
        charity_id: CharityId,
        score: i64,
        donor: &Identity,
        timestamp: u64,
    ) -> Result<Vote, EvaluatorError> {
        let score = Score::new(score)?;
        let donation =
            ledger
                .get(charity_id, donor)
                .ok_or_else(|| EvaluatorError::NoDonationFound {
                    charity_id,
                    donor: donor.clone(),
                })?;

        Ok(Vote {
            charity_id,
            donor: donor.clone(),
            score,
            weight: donation.amount,
            cast_at: timestamp,
        })
    }

    pub(crate) fn insert(&mut self, vote: Vote) {
        self.votes
            .entry(vote.charity_id)
            .or_default()
            .insert(vote.donor.clone(), vote);
    }

    pub fn get(&self, charity_id: CharityId, donor: &Identity) -> Option<&Vote> {
        self.votes.get(&charity_id)?.get(donor)
    }

    pub fn votes_for(&self, charity_id: CharityId) -> impl Iterator<Item = &Vote> {
        self.votes
            .get(&charity_id)
            .into_iter()
            .flat_map(|by_donor| by_donor.values())
    }

    /// Aggregate the live votes on one charity.
    ///
    /// Saturates rather than overflowing: a tally is advisory input to a
    /// scoring policy, not an accounting total.
    pub fn tally(&self, charity_id: CharityId) -> VoteTally {
        self.votes_for(charity_id)
            .fold(VoteTally::default(), |mut tally, vote| {
                tally.votes += 1;
                tally.total_weight = tally.total_weight.saturating_add(vote.weight);
                tally.weighted_score_sum = tally
                    .weighted_score_sum
                    .saturating_add(vote.weight as u128 * vote.score.get() as u128);
                tally
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vote> {
        self.votes.values().flat_map(|by_donor| by_donor.values())
    }

    pub fn len(&self) -> usize {
        self.votes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CharityRegistry;

    struct Fixture {
        registry: CharityRegistry,
        ledger: DonationLedger,
        book: VoteBook,
        id: CharityId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut registry = CharityRegistry::new();
            let id = registry.register("Test Charity", "A test charity", &Identity::new("wallet1"));
            Self {
                registry,
                ledger: DonationLedger::new(),
                book: VoteBook::new(),
                id,
            }
        }

        fn donate(&mut self, donor: &str, amount: u64) {
            let pending = self
                .ledger
                .prepare(&self.registry, self.id, amount, &Identity::new(donor), 0)
                .unwrap();
            self.registry.set_total_donations(self.id, pending.charity_total);
            self.ledger.insert(pending.donation);
        }

        fn vote(&mut self, donor: &str, score: i64) -> Result<(), EvaluatorError> {
            let vote = self
                .book
                .prepare(&self.ledger, self.id, score, &Identity::new(donor), 1)?;
            self.book.insert(vote);
            Ok(())
        }
    }

    #[test]
    fn vote_after_donation_succeeds() {
        let mut f = Fixture::new();
        f.donate("donor1", 1000);
        f.vote("donor1", 90).unwrap();
        let v = f.book.get(f.id, &Identity::new("donor1")).unwrap();
        assert_eq!(v.score.get(), 90);
        assert_eq!(v.weight, 1000);
    }

    #[test]
    fn vote_without_donation_is_rejected() {
        let mut f = Fixture::new();
        assert_eq!(
            f.vote("donor1", 50).unwrap_err(),
            EvaluatorError::NoDonationFound {
                charity_id: f.id,
                donor: Identity::new("donor1"),
            }
        );
        assert!(f.book.is_empty());
    }

    #[test]
    fn invalid_score_checked_before_eligibility() {
        let mut f = Fixture::new();
        assert_eq!(f.vote("nobody", 101).unwrap_err(), EvaluatorError::InvalidScore(101));
        assert_eq!(f.vote("nobody", -1).unwrap_err(), EvaluatorError::InvalidScore(-1));
    }

    #[test]
    fn boundary_scores_accepted() {
        let mut f = Fixture::new();
        f.donate("donor1", 1);
        f.vote("donor1", 0).unwrap();
        f.vote("donor1", 100).unwrap();
    }

    #[test]
    fn recast_overwrites_and_resnapshots_weight() {
        let mut f = Fixture::new();
        f.donate("donor1", 1000);
        f.vote("donor1", 90).unwrap();
        f.donate("donor1", 300);

        // Weight is a snapshot until the donor votes again.
        assert_eq!(f.book.get(f.id, &Identity::new("donor1")).unwrap().weight, 1000);

        f.vote("donor1", 40).unwrap();
        let v = f.book.get(f.id, &Identity::new("donor1")).unwrap();
        assert_eq!(v.score.get(), 40);
        assert_eq!(v.weight, 300);
        assert_eq!(f.book.len(), 1);
    }

    #[test]
    fn tally_weights_scores_by_stake() {
        let mut f = Fixture::new();
        f.donate("alice", 300);
        f.donate("bob", 100);
        f.vote("alice", 90).unwrap();
        f.vote("bob", 50).unwrap();

        let tally = f.book.tally(f.id);
        assert_eq!(tally.votes, 2);
        assert_eq!(tally.total_weight, 400);
        assert_eq!(tally.weighted_score_sum, 90 * 300 + 50 * 100);
        assert_eq!(tally.weighted_average(), Some(80));
    }

    #[test]
    fn tally_of_unvoted_charity_is_empty() {
        let f = Fixture::new();
        assert_eq!(f.book.tally(f.id), VoteTally::default());
        assert_eq!(f.book.tally(CharityId(42)), VoteTally::default());
    }
}
