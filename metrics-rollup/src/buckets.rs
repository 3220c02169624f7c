//! Bucket layouts for histograms.

use crate::error::ConfigError;

/// A bucket layout.
///
/// A layout defines a fixed number of buckets, the upper bound label of each bucket, and how an
/// observed value maps to a bucket index. Layouts are immutable: bounds are a pure function of the
/// bucket index, so a layout can be queried any number of times and shared freely.
pub trait Buckets {
    /// Gets the number of buckets in this layout.
    fn len(&self) -> usize;

    /// Returns `true` if this layout has no buckets.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the upper bound of the bucket at `index`.
    ///
    /// Returns `None` if `index` is not less than [`len`](Buckets::len).
    fn upper_bound_at(&self, index: usize) -> Option<u64>;

    /// Gets the index of the bucket that `value` falls into.
    ///
    /// The result is not clamped to the layout: values beyond the last bound produce indexes
    /// greater than or equal to [`len`](Buckets::len), and callers are expected to fold those into
    /// the last bucket.
    fn bucket_index_for(&self, value: u64) -> usize;
}

/// Exponentially-sized buckets.
///
/// Bucket `k` has the bound `start * step^k`, for `k` in `0..count`. A value `v` lands in bucket
/// `floor(log_step(v / start))`, so bucket `k` collects values in `[start * step^k, start *
/// step^(k + 1))`, and anything below `start` collects in bucket 0.
#[derive(Clone, Debug, PartialEq)]
pub struct ExponentialBuckets {
    start: u64,
    step: u64,
    count: usize,
    log_step: f64,
}

impl ExponentialBuckets {
    /// Creates a new `ExponentialBuckets`.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` is zero, if `step` is not greater than one, if `count` is zero,
    /// or if the largest bound, `start * step^(count - 1)`, does not fit in a `u64`.
    pub fn new(start: u64, step: u64, count: usize) -> Result<Self, ConfigError> {
        if start == 0 {
            return Err(ConfigError::ZeroStart);
        }
        if step <= 1 {
            return Err(ConfigError::InvalidStep { step });
        }
        if count == 0 {
            return Err(ConfigError::NoBuckets);
        }

        let buckets = ExponentialBuckets { start, step, count, log_step: (step as f64).ln() };
        if buckets.bound(count - 1).is_none() {
            return Err(ConfigError::BoundOverflow { start, step, count });
        }

        Ok(buckets)
    }

    /// Gets the smallest bucket bound.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Gets the growth factor between consecutive bounds.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Computes `start * step^index` without regard to `count`, or `None` on overflow.
    fn bound(&self, index: usize) -> Option<u64> {
        let exp = u32::try_from(index).ok()?;
        self.step.checked_pow(exp)?.checked_mul(self.start)
    }
}

impl Buckets for ExponentialBuckets {
    fn len(&self) -> usize {
        self.count
    }

    fn upper_bound_at(&self, index: usize) -> Option<u64> {
        if index < self.count {
            self.bound(index)
        } else {
            None
        }
    }

    fn bucket_index_for(&self, value: u64) -> usize {
        if value < self.start {
            return 0;
        }

        let estimate = ((value as f64 / self.start as f64).ln() / self.log_step).floor();
        let mut index = if estimate > 0.0 { estimate as usize } else { 0 };

        // The logarithm can land one bucket off on either side of an exact bound, such as
        // `ln(1000) / ln(10) == 2.9999999999999996`, so settle it against the integer bounds.
        while index > 0 && self.bound(index).map_or(true, |bound| bound > value) {
            index -= 1;
        }
        while self.bound(index + 1).is_some_and(|bound| bound <= value) {
            index += 1;
        }

        index
    }
}
