use parking_lot::Mutex;

use super::{Accumulator, WindowFormat, WindowMode, WindowSnapshot};
use crate::error::{ConfigError, NoDataError};

/// An [`Accumulator`] that can be shared between threads.
///
/// Every operation takes the same exclusive lock for its duration, so `add`, `tick`, `reset` and
/// reads are fully serialized. Reads are expected to be rare compared to `add`, so there is no
/// separate read lock.
#[derive(Debug)]
pub struct SyncAccumulator {
    name: String,
    size: usize,
    inner: Mutex<Accumulator>,
}

impl SyncAccumulator {
    /// Creates a new `SyncAccumulator` that remembers the last `size` intervals.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero.
    pub fn new<N: Into<String>>(name: N, size: usize) -> Result<Self, ConfigError> {
        Accumulator::new(name, size).map(Self::from)
    }

    /// Gets the name of this accumulator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the number of closed intervals this accumulator remembers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the number of ticks since creation or the last reset.
    pub fn total_ticks(&self) -> u64 {
        self.inner.lock().total_ticks()
    }

    /// Adds `value` to the open interval.
    pub fn add(&self, value: u64) {
        self.inner.lock().add(value)
    }

    /// Closes the open interval and opens a new one.
    pub fn tick(&self) {
        self.inner.lock().tick()
    }

    /// Clears every interval and rewinds the accumulator to its initial state.
    pub fn reset(&self) {
        self.inner.lock().reset()
    }

    /// Gets the sum of the most recently closed interval.
    pub fn peek_sum(&self) -> u64 {
        self.inner.lock().peek_sum()
    }

    /// Gets the average of the most recently closed interval.
    ///
    /// # Errors
    ///
    /// Returns [`NoDataError`] if that interval received no updates.
    pub fn peek_average(&self) -> Result<u64, NoDataError> {
        self.inner.lock().peek_average()
    }

    /// Gets the sum of each remembered interval, divided by `divider`.
    pub fn sum_window(&self, divider: u64) -> WindowSnapshot {
        self.inner.lock().sum_window(divider)
    }

    /// Gets the average of each remembered interval, divided by `divider`.
    pub fn average_window(&self, divider: u64) -> WindowSnapshot {
        self.inner.lock().average_window(divider)
    }

    /// Gets a snapshot of the remembered intervals, oldest first.
    pub fn window(&self, mode: WindowMode, divider: u64) -> WindowSnapshot {
        self.inner.lock().window(mode, divider)
    }

    /// Renders a snapshot of the remembered intervals as text.
    pub fn render(&self, mode: WindowMode, divider: u64, format: &WindowFormat) -> String {
        self.inner.lock().render(mode, divider, format)
    }

    /// Runs `f` against the inner accumulator while holding the lock.
    ///
    /// Useful for combining several operations atomically, such as reading a window and resetting
    /// it in one step.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Accumulator) -> R,
    {
        f(&mut self.inner.lock())
    }

    /// Consumes this `SyncAccumulator`, returning the inner accumulator.
    pub fn into_inner(self) -> Accumulator {
        self.inner.into_inner()
    }
}

impl From<Accumulator> for SyncAccumulator {
    fn from(inner: Accumulator) -> Self {
        let name = inner.name().to_string();
        let size = inner.size();
        SyncAccumulator { name, size, inner: Mutex::new(inner) }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::SyncAccumulator;
    use crate::accumulator::{WindowMode, WindowSnapshot};
    use crate::error::{ConfigError, NoDataError};

    #[test]
    fn test_matches_unsynchronized() {
        let acc = SyncAccumulator::new("requests", 3).unwrap();
        assert_eq!(acc.name(), "requests");
        assert_eq!(acc.size(), 3);

        acc.add(10);
        acc.tick();
        acc.add(20);
        acc.add(5);
        acc.tick();

        assert_eq!(
            acc.sum_window(1),
            WindowSnapshot { results: vec![10, 25], nonzero: true, max: 25, max_window: 25 }
        );
        assert_eq!(acc.average_window(1).results, vec![10, 12]);
        assert_eq!(acc.window(WindowMode::Sum, 5).results, vec![2, 5]);
        assert_eq!(acc.peek_sum(), 25);
        assert_eq!(acc.peek_average(), Ok(12));
        assert_eq!(acc.total_ticks(), 2);

        acc.reset();
        assert_eq!(acc.peek_average(), Err(NoDataError));
        assert_eq!(acc.into_inner().total_ticks(), 0);
    }

    #[test]
    fn test_name_and_size_while_locked() {
        let acc = SyncAccumulator::new("busy", 6).unwrap();
        acc.with(|inner| {
            inner.add(1);
            assert_eq!(acc.name(), "busy");
            assert_eq!(acc.size(), 6);
            inner.reset();
        });
        assert_eq!(acc.into_inner().name(), "busy");
    }

    #[test]
    fn test_zero_size() {
        assert_eq!(SyncAccumulator::new("empty", 0).unwrap_err(), ConfigError::EmptyWindow);
    }

    #[test]
    fn test_read_and_reset_together() {
        let acc = SyncAccumulator::new("scrape", 2).unwrap();
        acc.add(3);
        acc.tick();

        let snapshot = acc.with(|inner| {
            let snapshot = inner.sum_window(1);
            inner.reset();
            snapshot
        });
        assert_eq!(snapshot.results, vec![3]);
        assert_eq!(acc.sum_window(1), WindowSnapshot::default());
    }

    #[test]
    fn test_concurrent_adds() {
        const THREADS: u64 = 8;
        const ADDS: u64 = 1_000;

        let acc = Arc::new(SyncAccumulator::new("shared", 4).unwrap());
        let handles = (0..THREADS)
            .map(|_| {
                let acc = Arc::clone(&acc);
                thread::spawn(move || {
                    for _ in 0..ADDS {
                        acc.add(2);
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }

        acc.tick();
        assert_eq!(acc.peek_sum(), THREADS * ADDS * 2);
        assert_eq!(acc.peek_average(), Ok(2));
    }
}
