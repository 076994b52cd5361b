use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bunkmeter_core::model::SubjectRecord;
use bunkmeter_core::statistics::{bunk_budget, compute_overall, Target};

fn bench_bunk_budget(c: &mut Criterion) {
    let mut group = c.benchmark_group("bunk_budget");
    let target = Target::default();

    group.bench_function("safe,a=30,t=40", |b| {
        b.iter(|| bunk_budget(black_box(30), black_box(40), black_box(target)))
    });

    group.bench_function("danger,a=10,t=20", |b| {
        b.iter(|| bunk_budget(black_box(10), black_box(20), black_box(target)))
    });

    group.bench_function("safe,a=1e6,t=1e6", |b| {
        b.iter(|| bunk_budget(black_box(1_000_000), black_box(1_000_000), black_box(target)))
    });

    let strict = Target::new(0.99).unwrap();
    group.bench_function("danger,a=0,t=1e6,target=0.99", |b| {
        b.iter(|| bunk_budget(black_box(0), black_box(1_000_000), black_box(strict)))
    });

    group.finish();
}

fn bench_overall(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_overall");
    let subjects: Vec<SubjectRecord> = (0..12)
        .map(|i| SubjectRecord::new(format!("CS{i:03}"), format!("Subject {i}"), 30 + i, 45))
        .collect();

    group.bench_function("12 subjects", |b| {
        b.iter(|| compute_overall(black_box(&subjects), black_box(Target::default())))
    });

    group.finish();
}

criterion_group!(benches, bench_bunk_budget, bench_overall);
criterion_main!(benches);
