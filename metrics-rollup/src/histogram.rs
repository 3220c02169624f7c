//! A lock-free bucketed histogram.
use std::sync::atomic::Ordering;

use crossbeam_utils::CachePadded;
use tracing::debug;

use crate::atomics::AtomicU64;
use crate::buckets::{Buckets, ExponentialBuckets};
use crate::error::ConfigError;
use crate::exposition::PrometheusRender;
use crate::formatting::{write_help_line, write_metric_line, write_type_line};

/// A bucketed histogram that can be updated concurrently.
///
/// This histogram tracks the number of samples that fall into each bucket of a fixed layout, along
/// with the total count and sum of all samples. Buckets are not cumulative: each observation
/// increments exactly one bucket, and values beyond the last bound are folded into the last bucket.
///
/// ## Consistency
///
/// [`observe`](Histogram::observe) performs three independent atomic updates: the bucket, the
/// count, and the sum. Each one is atomic on its own, but they are not applied as a unit, so a
/// reader racing with writers may see a count or sum that is one or two observations ahead of, or
/// behind, the bucket counts. Once writers are quiescent, the bucket counts always add up to the
/// count.
#[derive(Debug)]
pub struct Histogram<B = ExponentialBuckets> {
    buckets: B,
    upper_bounds: Box<[u64]>,
    bins: Box<[AtomicU64]>,
    count: CachePadded<AtomicU64>,
    sum: CachePadded<AtomicU64>,
}

impl Histogram<ExponentialBuckets> {
    /// Creates a new `Histogram` with exponentially-sized buckets.
    ///
    /// See [`ExponentialBuckets::new`] for the meaning of each parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket parameters are invalid.
    pub fn exponential(start: u64, step: u64, count: usize) -> Result<Self, ConfigError> {
        Self::new(ExponentialBuckets::new(start, step, count)?)
    }
}

impl<B: Buckets> Histogram<B> {
    /// Creates a new `Histogram` from the given bucket layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout has no buckets, or if its bounds are not strictly ascending.
    ///
    /// Buckets are read until the layout stops returning bounds, so a layout that returns fewer
    /// bounds than its reported length yields a histogram with only those buckets.
    pub fn new(buckets: B) -> Result<Self, ConfigError> {
        let upper_bounds = (0..buckets.len())
            .map_while(|i| buckets.upper_bound_at(i))
            .collect::<Box<[u64]>>();
        if upper_bounds.is_empty() {
            return Err(ConfigError::NoBuckets);
        }
        if let Some(index) = upper_bounds.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::UnorderedBounds { index: index + 1 });
        }

        let bins = upper_bounds.iter().map(|_| AtomicU64::new(0)).collect::<Box<[AtomicU64]>>();

        debug!(
            buckets = upper_bounds.len(),
            smallest_bound = upper_bounds[0],
            largest_bound = upper_bounds[upper_bounds.len() - 1],
            "Created histogram."
        );

        Ok(Histogram {
            buckets,
            upper_bounds,
            bins,
            count: CachePadded::new(AtomicU64::new(0)),
            sum: CachePadded::new(AtomicU64::new(0)),
        })
    }

    /// Records a single sample.
    ///
    /// The sum wraps around on overflow.
    pub fn observe(&self, value: u64) {
        let last = self.bins.len() - 1;
        let bin = self.buckets.bucket_index_for(value).min(last);

        self.bins[bin].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.fetch_add(value, Ordering::Relaxed);
    }

    /// Gets the current count of each bucket, in bucket order.
    ///
    /// Each bucket is read atomically, but the buckets are not read as a unit.
    pub fn snapshot(&self) -> Vec<u64> {
        self.bins.iter().map(|bin| bin.load(Ordering::Relaxed)).collect()
    }

    /// Gets the number of samples recorded.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Gets the sum of all samples recorded.
    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    /// Gets the upper bound of each bucket, in ascending order.
    pub fn upper_bounds(&self) -> &[u64] {
        &self.upper_bounds
    }

    /// Gets the bucket layout.
    pub fn layout(&self) -> &B {
        &self.buckets
    }

    /// Gets the buckets.
    ///
    /// Buckets are tuples, where the first element is the upper bound of the bucket, and the second
    /// element is the count of samples in that bucket.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        self.upper_bounds.iter().copied().zip(self.snapshot()).collect()
    }

    /// Joins the current bucket counts with `delimiter`.
    ///
    /// Useful for compact, log-friendly output: a histogram with counts of 1, 0 and 5 formats as
    /// `1,0,5` with a delimiter of `","`.
    pub fn format_bins(&self, delimiter: &str) -> String {
        self.snapshot().iter().map(u64::to_string).collect::<Vec<_>>().join(delimiter)
    }
}

impl<B: Buckets> PrometheusRender for Histogram<B> {
    fn write_prometheus(&self, buffer: &mut String, name: &str, help: &str) {
        write_help_line(buffer, name, help);
        write_type_line(buffer, name, "histogram");
        for (bound, count) in self.buckets() {
            write_metric_line(buffer, name, Some("latency_bucket"), Some(("le", bound)), count);
        }
        write_metric_line::<u64, _>(buffer, name, Some("sum"), None, self.sum());
        write_metric_line::<u64, _>(buffer, name, Some("count"), None, self.count());
    }
}
