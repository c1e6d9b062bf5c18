use criterion::{criterion_group, criterion_main, Criterion};
use fastrand::Rng;
use reshuffler::config::PenaltyWeights;
use reshuffler::consts::DEFAULT_NUM_CATEGORIES;
use reshuffler::core_types::TokenIdGenerator;
use reshuffler::optimizer::SearchState;
use reshuffler::scorer::Allocation;
use std::hint::black_box;

fn setup_state(num_owners: usize) -> SearchState {
    let mut rng = Rng::with_seed(1234);
    let mut ids = TokenIdGenerator::new();

    let allocations = (0..num_owners)
        .map(|i| {
            let n = rng.usize(1..8);
            let categories: Vec<usize> = (0..n).map(|_| rng.usize(0..DEFAULT_NUM_CATEGORIES)).collect();
            Allocation::new(
                format!("0x{:040x}", i),
                ids.tokens_from_categories(&categories),
                DEFAULT_NUM_CATEGORIES,
            )
            .unwrap()
        })
        .collect();

    SearchState::new(allocations, Rng::with_seed(42), PenaltyWeights::default()).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut small = setup_state(50);
    c.bench_function("neighbor_50_owners", |b| {
        b.iter(|| black_box(small.neighbor()))
    });

    let mut large = setup_state(500);
    c.bench_function("neighbor_500_owners", |b| {
        b.iter(|| black_box(large.neighbor()))
    });

    let state = setup_state(500);
    c.bench_function("recompute_score_500_owners", |b| {
        b.iter(|| black_box(state.recompute_score()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
