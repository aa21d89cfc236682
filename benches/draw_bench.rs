//! Benchmarks for draw computation
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fairdraw::{derive_seed, get_lottery_result, pick_winner, score_ticket, verify, TicketId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const SEED_HEX: &str = "b20dd8bdd812e18599a5f4b49437265f5ef51619181f1b0f6f57775bf1fbae60";

/// Reproducible ticket set
fn ticket_set(count: usize) -> Vec<TicketId> {
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    (0..count).map(|_| rng.gen_range(0..1_000_000)).collect()
}

fn block_hashes() -> Vec<String> {
    vec!["aa".repeat(32), "bb".repeat(32), "cc".repeat(32)]
}

fn benchmark_single_score(c: &mut Criterion) {
    c.bench_function("score_ticket", |b| {
        b.iter(|| score_ticket(black_box(SEED_HEX), black_box(123)));
    });
}

fn benchmark_seed(c: &mut Criterion) {
    let hashes = block_hashes();
    c.bench_function("derive_seed (3 hashes)", |b| {
        b.iter(|| derive_seed(black_box(&hashes)));
    });
}

fn benchmark_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Winner Selection");

    for count in [10usize, 1_000, 100_000].iter() {
        let tickets = ticket_set(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &tickets, |b, tickets| {
            b.iter(|| pick_winner(black_box(SEED_HEX), black_box(tickets)));
        });
    }

    group.finish();
}

fn benchmark_full_draw(c: &mut Criterion) {
    let hashes = block_hashes();
    let tickets = ticket_set(1_000);

    c.bench_function("draw + verify (1000 tickets)", |b| {
        b.iter(|| {
            if let Ok(result) = get_lottery_result(black_box(&hashes), black_box(&tickets)) {
                verify(&result.seed_hex(), &tickets, result.winner());
            }
        });
    });
}

criterion_group!(
    benches,
    benchmark_single_score,
    benchmark_seed,
    benchmark_selection,
    benchmark_full_draw
);
criterion_main!(benches);
