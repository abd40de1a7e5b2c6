//! Shared test helpers for E2E and adversarial tests.

use std::sync::Arc;

use dace_core::clock::ManualClock;
use dace_core::types::{CharityId, Identity};
use dace_node::{Evaluator, EvaluatorConfig};

/// Identity from a short label.
pub fn who(label: &str) -> Identity {
    Identity::new(label)
}

/// In-memory evaluator with a manual clock starting at 1.
pub fn test_evaluator() -> (Arc<Evaluator>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1));
    let evaluator = Evaluator::in_memory(EvaluatorConfig::default(), clock.clone());
    (evaluator, clock)
}

/// RocksDB-backed evaluator in a fresh temp directory.
pub fn persistent_evaluator() -> (Arc<Evaluator>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = EvaluatorConfig {
        data_dir: dir.path().to_path_buf(),
        ..EvaluatorConfig::default()
    };
    let evaluator = Evaluator::open_with_clock(config, Arc::new(ManualClock::new(1)))
        .expect("open evaluator");
    (evaluator, dir)
}

/// Register `n` charities named `Charity 0..n`, each owned by `wallet{i}`.
pub fn register_many(evaluator: &Evaluator, n: usize) -> Vec<CharityId> {
    (0..n)
        .map(|i| {
            evaluator
                .register(
                    &format!("Charity {i}"),
                    &format!("Description {i}"),
                    &who(&format!("wallet{i}")),
                )
                .expect("registration always succeeds")
        })
        .collect()
}
