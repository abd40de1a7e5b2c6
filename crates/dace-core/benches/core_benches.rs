//! Criterion benchmarks for dace-core critical operations.
//!
//! Covers: proportional allocation, full distribution rounds over a
//! populated state, and vote tallying.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dace_core::distribution::allocate;
use dace_core::state::EvaluatorState;
use dace_core::types::{CharityId, Identity};

/// Build a state with `n` charities, each with an impact score, a handful
/// of donors, and one vote per donor.
fn populated_state(n: u64) -> EvaluatorState {
    let mut state = EvaluatorState::new();
    for i in 0..n {
        let id = state.register(&format!("charity-{i}"), "bench", &Identity::new("owner"));
        state.set_impact_score(id, (i % 101) as i64, i).unwrap();
        for d in 0..4u64 {
            let donor = Identity::new(format!("donor-{d}"));
            state.record_donation(id, 100 + d * 10, &donor, i).unwrap();
            state.cast_vote(id, ((i + d) % 101) as i64, &donor, i).unwrap();
        }
    }
    state
}

fn bench_allocate(c: &mut Criterion) {
    let scores: Vec<(CharityId, u64)> = (0..10_000u64)
        .map(|i| (CharityId(i), (i * 7919) % 10_001))
        .collect();

    c.bench_function("allocate_10000_charities", |b| {
        b.iter(|| allocate(black_box(1_000_000_000), 1, black_box(&scores)))
    });
}

fn bench_distribute(c: &mut Criterion) {
    let state_100 = populated_state(100);
    let state_1000 = populated_state(1_000);

    c.bench_function("distribute_100_charities", |b| {
        b.iter(|| black_box(&state_100).prepare_distribution(black_box(1_000_000)))
    });

    c.bench_function("distribute_1000_charities", |b| {
        b.iter(|| black_box(&state_1000).prepare_distribution(black_box(1_000_000)))
    });
}

fn bench_vote_tally(c: &mut Criterion) {
    let state = populated_state(1_000);

    c.bench_function("vote_tally_single_charity", |b| {
        b.iter(|| black_box(&state).vote_tally(black_box(CharityId(500))))
    });
}

criterion_group!(benches, bench_allocate, bench_distribute, bench_vote_tally);
criterion_main!(benches);
