//! RocksDB-backed persistent evaluator state.
//!
//! Each store lives in its own column family. Values are bincode encodings
//! of the `dace-core` record types. Keys start with the big-endian charity
//! id so that iteration order matches identifier order:
//!
//! | CF | key | value |
//! |----|-----|-------|
//! | `charities` | `id` | [`Charity`] |
//! | `donations` | `id ‖ donor` | [`Donation`] |
//! | `votes` | `id ‖ donor` | [`Vote`] |
//! | `impact_scores` | `id` | [`ImpactScore`] |
//! | `metadata` | `"last_distribution"` | [`Distribution`] |
//!
//! Every [`StateChange`] is committed as one atomic [`WriteBatch`].

use std::path::Path;

use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use tracing::{debug, info};

use dace_core::impact::ImpactScores;
use dace_core::ledger::DonationLedger;
use dace_core::registry::CharityRegistry;
use dace_core::state::{EvaluatorState, StateChange};
use dace_core::types::{Charity, CharityId, Distribution, Donation, Identity, ImpactScore, Vote};
use dace_core::voting::VoteBook;

use crate::error::NodeError;

// --- Column family names ---

const CF_CHARITIES: &str = "charities";
const CF_DONATIONS: &str = "donations";
const CF_VOTES: &str = "votes";
const CF_IMPACT_SCORES: &str = "impact_scores";
const CF_METADATA: &str = "metadata";

/// All column family names.
const ALL_CFS: &[&str] = &[
    CF_CHARITIES,
    CF_DONATIONS,
    CF_VOTES,
    CF_IMPACT_SCORES,
    CF_METADATA,
];

// --- Metadata keys ---

const META_LAST_DISTRIBUTION: &[u8] = b"last_distribution";

/// Durable evaluator state.
///
/// Not a source of truth on its own: the [`Evaluator`](crate::Evaluator)
/// validates every change against its in-memory state before committing it
/// here.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create a RocksDB database at the given path.
    ///
    /// Creates all column families if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cf_descriptors)?;
        info!(path = %path.as_ref().display(), "opened evaluator store");
        Ok(Self { db })
    }

    /// Durably write one change.
    ///
    /// Donation and transparency changes rewrite the affected charity
    /// record, so the stored total and score never disagree with the ledger.
    pub fn commit(&self, change: &StateChange) -> Result<(), NodeError> {
        let mut batch = WriteBatch::default();

        match change {
            StateChange::CharityRegistered(charity) => {
                batch.put_cf(
                    self.cf_handle(CF_CHARITIES)?,
                    charity.id.to_be_bytes(),
                    encode(charity)?,
                );
            }
            StateChange::DonationRecorded {
                donation,
                charity_total,
            } => {
                let mut charity = self.require_charity(donation.charity_id)?;
                charity.total_donations = *charity_total;
                batch.put_cf(
                    self.cf_handle(CF_CHARITIES)?,
                    charity.id.to_be_bytes(),
                    encode(&charity)?,
                );
                batch.put_cf(
                    self.cf_handle(CF_DONATIONS)?,
                    pair_key(donation.charity_id, &donation.donor),
                    encode(donation)?,
                );
            }
            StateChange::VoteCast(vote) => {
                batch.put_cf(
                    self.cf_handle(CF_VOTES)?,
                    pair_key(vote.charity_id, &vote.donor),
                    encode(vote)?,
                );
            }
            StateChange::ImpactScoreSet(record) => {
                batch.put_cf(
                    self.cf_handle(CF_IMPACT_SCORES)?,
                    record.charity_id.to_be_bytes(),
                    encode(record)?,
                );
            }
            StateChange::TransparencyScoreSet { charity_id, score } => {
                let mut charity = self.require_charity(*charity_id)?;
                charity.transparency_score = *score;
                batch.put_cf(
                    self.cf_handle(CF_CHARITIES)?,
                    charity.id.to_be_bytes(),
                    encode(&charity)?,
                );
            }
            StateChange::IncentivesDistributed(distribution) => {
                batch.put_cf(
                    self.cf_handle(CF_METADATA)?,
                    META_LAST_DISTRIBUTION,
                    encode(distribution)?,
                );
            }
        }

        self.db.write(batch)?;
        debug!(kind = change.kind(), "change committed to store");
        Ok(())
    }

    /// Rebuild the full in-memory state from disk.
    ///
    /// # Errors
    ///
    /// [`NodeError::Corrupt`] if charity ids are not dense from zero.
    pub fn load_state(&self) -> Result<EvaluatorState, NodeError> {
        let charities: Vec<Charity> = self.load_cf(CF_CHARITIES)?;
        let registry = CharityRegistry::from_records(charities)
            .map_err(|e| NodeError::Corrupt(format!("charity ids are not dense: {e}")))?;

        let donations: Vec<Donation> = self.load_cf(CF_DONATIONS)?;
        let votes: Vec<Vote> = self.load_cf(CF_VOTES)?;
        let impact: Vec<ImpactScore> = self.load_cf(CF_IMPACT_SCORES)?;
        let last_distribution = self.last_distribution()?;

        info!(
            charities = registry.len(),
            donations = donations.len(),
            votes = votes.len(),
            impact_scores = impact.len(),
            "loaded evaluator state"
        );

        Ok(EvaluatorState::from_parts(
            registry,
            DonationLedger::from_records(donations),
            VoteBook::from_records(votes),
            ImpactScores::from_records(impact),
            last_distribution,
        ))
    }

    pub fn get_charity(&self, id: CharityId) -> Result<Option<Charity>, NodeError> {
        self.get_decoded(CF_CHARITIES, &id.to_be_bytes())
    }

    pub fn get_donation(&self, id: CharityId, donor: &Identity) -> Result<Option<Donation>, NodeError> {
        self.get_decoded(CF_DONATIONS, &pair_key(id, donor))
    }

    pub fn last_distribution(&self) -> Result<Option<Distribution>, NodeError> {
        self.get_decoded(CF_METADATA, META_LAST_DISTRIBUTION)
    }

    /// Flush memtables to disk.
    pub fn flush(&self) -> Result<(), NodeError> {
        for name in ALL_CFS {
            self.db.flush_cf(self.cf_handle(name)?)?;
        }
        Ok(())
    }

    // --- Internal helpers ---

    fn cf_handle(&self, name: &str) -> Result<&rocksdb::ColumnFamily, NodeError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| NodeError::Storage(format!("missing column family: {name}")))
    }

    fn require_charity(&self, id: CharityId) -> Result<Charity, NodeError> {
        self.get_charity(id)?
            .ok_or_else(|| NodeError::Corrupt(format!("charity {id} missing from store")))
    }

    fn get_decoded<T: bincode::Decode<()>>(
        &self,
        cf: &str,
        key: &[u8],
    ) -> Result<Option<T>, NodeError> {
        match self.db.get_cf(self.cf_handle(cf)?, key)? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn load_cf<T: bincode::Decode<()>>(&self, cf: &str) -> Result<Vec<T>, NodeError> {
        let mut out = Vec::new();
        for item in self.db.iterator_cf(self.cf_handle(cf)?, IteratorMode::Start) {
            let (_key, value) = item?;
            out.push(decode(&value)?);
        }
        Ok(out)
    }
}

/// `charity_id (big-endian) ‖ donor bytes`.
fn pair_key(id: CharityId, donor: &Identity) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + donor.as_str().len());
    key.extend_from_slice(&id.to_be_bytes());
    key.extend_from_slice(donor.as_str().as_bytes());
    key
}

fn encode<T: bincode::Encode>(value: &T) -> Result<Vec<u8>, NodeError> {
    bincode::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| NodeError::Codec(e.to_string()))
}

fn decode<T: bincode::Decode<()>>(bytes: &[u8]) -> Result<T, NodeError> {
    bincode::decode_from_slice(bytes, bincode::config::standard())
        .map(|(value, _)| value)
        .map_err(|e| NodeError::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a temporary RocksStore.
    fn temp_store() -> (RocksStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksStore::open(dir.path().join("evaluator")).unwrap();
        (store, dir)
    }

    /// Prepare a change on `state`, commit it to `store`, then apply it.
    fn commit(store: &RocksStore, state: &mut EvaluatorState, change: StateChange) {
        store.commit(&change).unwrap();
        state.apply(change);
    }

    fn donor(s: &str) -> Identity {
        Identity::new(s)
    }

    #[test]
    fn empty_store_loads_empty_state() {
        let (store, _dir) = temp_store();
        assert_eq!(store.load_state().unwrap(), EvaluatorState::new());
        assert!(store.last_distribution().unwrap().is_none());
    }

    #[test]
    fn registration_persists() {
        let (store, _dir) = temp_store();
        let mut state = EvaluatorState::new();
        let change = state.prepare_registration("Test Charity", "A test charity", &donor("wallet1"));
        commit(&store, &mut state, change);

        let stored = store.get_charity(CharityId(0)).unwrap().unwrap();
        assert_eq!(stored.name, "Test Charity");
        assert_eq!(stored.total_donations, 0);
    }

    #[test]
    fn donation_updates_charity_total_on_disk() {
        let (store, _dir) = temp_store();
        let mut state = EvaluatorState::new();
        let change = state.prepare_registration("c", "", &donor("w"));
        commit(&store, &mut state, change);

        for (amount, ts) in [(100u64, 1u64), (50, 2)] {
            let change = state.prepare_donation(CharityId(0), amount, &donor("d"), ts).unwrap();
            commit(&store, &mut state, change);
        }

        assert_eq!(store.get_charity(CharityId(0)).unwrap().unwrap().total_donations, 150);
        let d = store.get_donation(CharityId(0), &donor("d")).unwrap().unwrap();
        assert_eq!(d.amount, 50);
        assert_eq!(d.timestamp, 2);
    }

    #[test]
    fn donation_for_missing_charity_record_is_corrupt() {
        let (store, _dir) = temp_store();
        let mut state = EvaluatorState::new();
        state.register("only in memory", "", &donor("w"));
        let change = state.prepare_donation(CharityId(0), 1, &donor("d"), 1).unwrap();
        assert!(matches!(store.commit(&change), Err(NodeError::Corrupt(_))));
        assert!(store.get_donation(CharityId(0), &donor("d")).unwrap().is_none());
    }

    #[test]
    fn full_state_round_trips_through_disk() {
        let (store, dir) = temp_store();
        let mut state = EvaluatorState::new();

        let changes_a = state.prepare_registration("A", "first", &donor("wa"));
        commit(&store, &mut state, changes_a);
        let change_b = state.prepare_registration("B", "second", &donor("wb"));
        commit(&store, &mut state, change_b);

        let steps: Vec<Box<dyn Fn(&EvaluatorState) -> StateChange>> = vec![
            Box::new(|s| s.prepare_donation(CharityId(0), 500, &donor("alice"), 1).unwrap()),
            Box::new(|s| s.prepare_donation(CharityId(1), 300, &donor("bob"), 2).unwrap()),
            Box::new(|s| s.prepare_vote(CharityId(0), 90, &donor("alice"), 3).unwrap()),
            Box::new(|s| s.prepare_impact_score(CharityId(0), 80, 4).unwrap()),
            Box::new(|s| s.prepare_impact_score(CharityId(1), 60, 4).unwrap()),
            Box::new(|s| s.prepare_impact_score(CharityId(77), 10, 4).unwrap()),
            Box::new(|s| s.prepare_transparency_score(CharityId(1), 90).unwrap()),
            Box::new(|s| s.prepare_distribution(1_000_000).unwrap()),
        ];
        for step in steps {
            let change = step(&state);
            commit(&store, &mut state, change);
        }
        store.flush().unwrap();
        drop(store);

        let reopened = RocksStore::open(dir.path().join("evaluator")).unwrap();
        let loaded = reopened.load_state().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.rounds_completed(), 1);
        assert_eq!(loaded.get_charity(CharityId(1)).unwrap().transparency_score.get(), 90);
    }

    #[test]
    fn pair_keys_sort_by_charity_first() {
        let a = pair_key(CharityId(1), &donor("zzz"));
        let b = pair_key(CharityId(2), &donor("aaa"));
        assert!(a < b);
    }
}
