use coedit_core::{SplitSequence, Ticket};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sequential_append(n: usize) -> SplitSequence {
    let mut seq = SplitSequence::new();
    for i in 0..n {
        let at = seq.visible_len();
        let (from, to) = seq.resolve_range(at, at).unwrap();
        let ticket = Ticket::new(i as u64 + 1, "bench".to_string());
        seq.apply_edit(&from, &to, None, "lorem ipsum ", &ticket)
            .unwrap();
    }
    seq
}

fn bench_sequential_append(c: &mut Criterion) {
    c.bench_function("sequential_append_1k", |b| {
        b.iter(|| black_box(sequential_append(1_000)))
    });
}

fn bench_random_range_edits(c: &mut Criterion) {
    c.bench_function("random_range_edits_1k", |b| {
        b.iter(|| {
            let mut seq = sequential_append(100);
            // Deterministic pseudo-random ranges, xorshift keeps the bench
            // free of an RNG dependency.
            let mut state: u64 = 0x9e3779b97f4a7c15;
            for i in 0..1_000u64 {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let len = seq.visible_len();
                let from = (state as usize) % (len + 1);
                let to = (from + 3).min(len);
                let (f, t) = seq.resolve_range(from, to).unwrap();
                let ticket = Ticket::new(10_000 + i, "bench".to_string());
                seq.apply_edit(&f, &t, None, "x", &ticket).unwrap();
            }
            black_box(seq)
        })
    });
}

fn bench_resolve_range(c: &mut Criterion) {
    let mut seq = sequential_append(1_000);
    let len = seq.visible_len();
    c.bench_function("resolve_range_mid", |b| {
        b.iter(|| black_box(seq.resolve_range(len / 2, len / 2 + 5).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_sequential_append,
    bench_random_range_edits,
    bench_resolve_range
);
criterion_main!(benches);
