use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use metrics_rollup::{Histogram, PrometheusRender};
use rand::Rng;

fn observe_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram");
    group.throughput(Throughput::Elements(1));

    let histogram = Histogram::exponential(1, 2, 24).unwrap();
    let mut rng = rand::rng();
    let values = (0..1024).map(|_| rng.random_range(0..1u64 << 26)).collect::<Vec<_>>();

    group.bench_function("observe", |b| {
        let mut i = 0;
        b.iter(|| {
            histogram.observe(values[i & 1023]);
            i += 1;
        })
    });

    for count in [8, 24, 48] {
        let histogram = Histogram::exponential(1, 2, count).unwrap();
        for value in &values {
            histogram.observe(*value);
        }
        group.bench_with_input(BenchmarkId::new("render", count), &histogram, |b, histogram| {
            b.iter(|| histogram.render("request_latency", "Request latency in microseconds"))
        });
    }

    group.finish();
}

criterion_group!(benches, observe_benchmark);
criterion_main!(benches);
