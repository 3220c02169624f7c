//! Simulates a service recording request latencies and rates, then prints what a scrape would see.
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use metrics_rollup::{
    atomics::AtomicU64, Histogram, StructureWriter, SyncAccumulator, WindowFormat, WindowMode,
};
use rand::Rng;
use tracing::info;

fn main() {
    tracing_subscriber::fmt::init();

    let latency = Arc::new(Histogram::exponential(50, 2, 10).expect("valid buckets"));
    let requests = Arc::new(SyncAccumulator::new("request_latency_us", 8).expect("valid window"));
    let served = Arc::new(AtomicU64::new(0));

    let workers = (0..4)
        .map(|_| {
            let latency = Arc::clone(&latency);
            let requests = Arc::clone(&requests);
            let served = Arc::clone(&served);
            thread::spawn(move || {
                let mut rng = rand::rng();
                for _ in 0..2_000 {
                    let micros = rng.random_range(20..40_000);
                    latency.observe(micros);
                    requests.add(micros);
                    served.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                    thread::sleep(Duration::from_micros(200));
                }
            })
        })
        .collect::<Vec<_>>();

    for _ in 0..8 {
        thread::sleep(Duration::from_millis(100));
        requests.tick();
        info!(last_interval_sum = requests.peek_sum(), "Ticked request window.");
    }

    for worker in workers {
        worker.join().expect("worker panicked");
    }

    let text = StructureWriter::new()
        .field("requests_served", "Requests served", &*served)
        .field("rtt", "Request latency in microseconds", &*latency)
        .finish();
    println!("{}", text);

    let format = WindowFormat::new()
        .with_template("{name} (avg per interval, max {max}):\n{values}\n")
        .with_columns(4)
        .with_column_width(10);
    println!("{}", requests.render(WindowMode::Average, 1, &format));
}
