//! Benchmarks for the close-time tally and vote admission
//!
//! The tally runs once per motion, under the motion's lock, so its cost
//! bounds how long readers wait at the moment of closing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use plenary::motion::{tally, Ballot, Motion, MotionId, SessionDuration, VoteId, VoteRecord};
use std::time::{Duration, SystemTime};

fn t0() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

/// Votes alternating two yes, one no
fn create_votes(count: usize) -> Vec<VoteRecord> {
    let motion_id = MotionId::new();
    (0..count)
        .map(|i| VoteRecord {
            id: VoteId::new(),
            motion_id,
            member_id: format!("member-{}", i),
            ballot: if i % 3 == 2 { Ballot::No } else { Ballot::Yes },
            cast_at: t0(),
        })
        .collect()
}

fn benchmark_tally(c: &mut Criterion) {
    let mut group = c.benchmark_group("tally");

    for size in [10, 100, 1_000, 10_000] {
        let votes = create_votes(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &votes, |b, votes| {
            b.iter(|| tally(black_box(votes)));
        });
    }

    group.finish();
}

fn benchmark_close(c: &mut Criterion) {
    let mut group = c.benchmark_group("close_if_elapsed");

    for size in [100, 1_000] {
        let mut motion = Motion::new("Budget 2025", None, t0()).unwrap();
        motion
            .open_session(t0(), SessionDuration::default())
            .unwrap();
        for i in 0..size {
            let ballot = if i % 2 == 0 { Ballot::Yes } else { Ballot::No };
            motion
                .record_vote(&format!("member-{}", i), ballot, t0())
                .unwrap();
        }
        let after = t0() + Duration::from_secs(120);

        group.bench_with_input(BenchmarkId::from_parameter(size), &motion, |b, motion| {
            b.iter(|| {
                let mut motion = motion.clone();
                black_box(motion.close_if_elapsed(after))
            });
        });
    }

    group.finish();
}

fn benchmark_record_vote(c: &mut Criterion) {
    let mut motion = Motion::new("Budget 2025", None, t0()).unwrap();
    motion
        .open_session(t0(), SessionDuration::default())
        .unwrap();
    for i in 0..1_000 {
        motion
            .record_vote(&format!("member-{}", i), Ballot::Yes, t0())
            .unwrap();
    }

    // Duplicate detection scans existing ballots
    c.bench_function("record_vote_after_1000", |b| {
        b.iter(|| {
            let mut motion = motion.clone();
            black_box(motion.record_vote("member-new", Ballot::No, t0()))
        });
    });
}

criterion_group!(benches, benchmark_tally, benchmark_close, benchmark_record_vote);
criterion_main!(benches);
