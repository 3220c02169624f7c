use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use metrics_rollup::{Accumulator, SyncAccumulator};

fn accumulator_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulator");
    group.throughput(Throughput::Elements(1));

    group.bench_function("add", |b| {
        let mut acc = Accumulator::new("bench", 60).unwrap();
        b.iter(|| acc.add(42))
    });
    group.bench_function("add (synchronized)", |b| {
        let acc = SyncAccumulator::new("bench", 60).unwrap();
        b.iter(|| acc.add(42))
    });
    group.bench_function("sum_window", |b| {
        let mut acc = Accumulator::new("bench", 60).unwrap();
        for i in 0..120 {
            acc.add(i);
            acc.tick();
        }
        b.iter(|| acc.sum_window(1))
    });

    group.finish();
}

criterion_group!(benches, accumulator_benchmark);
criterion_main!(benches);
