use criterion::{black_box, criterion_group, criterion_main, Criterion};

use certchain_core::{hash_block, AdmissionGate, Difficulty, GENESIS_PROOF};
use certchain_testkit::vectors::all_vectors;

fn bench_find_proof(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_proof");
    for zeros in [1u8, 2, 3] {
        let gate = AdmissionGate::new(Difficulty::new(zeros).unwrap());
        group.bench_function(format!("difficulty_{}", zeros), |b| {
            b.iter(|| gate.find_proof(black_box(GENESIS_PROOF)))
        });
    }
    group.finish();
}

fn bench_is_valid(c: &mut Criterion) {
    let gate = AdmissionGate::default();
    c.bench_function("is_valid", |b| {
        b.iter(|| gate.is_valid(black_box(GENESIS_PROOF), black_box(35293)))
    });
}

fn bench_hash_block(c: &mut Criterion) {
    let block = all_vectors().remove(1).block;
    c.bench_function("hash_block", |b| b.iter(|| hash_block(black_box(&block))));
}

criterion_group!(benches, bench_find_proof, bench_is_valid, bench_hash_block);
criterion_main!(benches);
