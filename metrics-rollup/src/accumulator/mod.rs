//! Time-windowed accumulation.
//!
//! An [`Accumulator`] tracks the sum and the number of updates for consecutive intervals of time.
//! Calling code decides how long an interval is: every call to [`tick`](Accumulator::tick) closes
//! the interval currently being written to and opens a new one. The accumulator remembers the last
//! `size` closed intervals, which can be read back oldest-first as sums or as averages.
//!
//! ```rust
//! # use metrics_rollup::Accumulator;
//! let mut requests = Accumulator::new("requests", 3).unwrap();
//! requests.add(10);
//! requests.tick();
//! requests.add(20);
//! requests.add(5);
//! requests.tick();
//!
//! let sums = requests.sum_window(1);
//! assert_eq!(sums.results, vec![10, 25]);
//! assert_eq!(sums.max, 25);
//!
//! let averages = requests.average_window(1);
//! assert_eq!(averages.results, vec![10, 12]);
//! ```
//!
//! `Accumulator` requires `&mut self` for every update, so it suits a single writer, or callers
//! that already serialize access on their own. [`SyncAccumulator`] wraps the same logic in a mutex
//! so it can be shared between a hot path calling `add` and a timer calling `tick`.
use tracing::{debug, trace};

use crate::error::{ConfigError, NoDataError};

mod format;
pub use self::format::WindowFormat;

mod sync;
pub use self::sync::SyncAccumulator;

/// A single interval: the sum of its values and the number of values added.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Slot {
    sum: u64,
    updates: u64,
}

/// How interval values are normalized when reading a window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowMode {
    /// Each result is the interval sum, divided by the divider.
    Sum,
    /// Each result is the interval average, divided by the divider.
    Average,
}

/// A snapshot of the most recent closed intervals.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WindowSnapshot {
    /// Normalized value of each interval, oldest first.
    ///
    /// Intervals without updates report zero.
    pub results: Vec<u64>,
    /// Whether any interval in the window received an update.
    pub nonzero: bool,
    /// Largest normalized value across intervals with updates.
    pub max: u64,
    /// Largest raw interval sum across intervals with updates.
    pub max_window: u64,
}

/// A fixed-size ring of time intervals.
///
/// The ring holds one more slot than the window size: the open slot being written to by
/// [`add`](Accumulator::add), plus `size` closed slots that can be read back.
#[derive(Clone, Debug)]
pub struct Accumulator {
    name: String,
    slots: Box<[Slot]>,
    cursor: usize,
    total_ticks: u64,
}

impl Accumulator {
    /// Creates a new `Accumulator` that remembers the last `size` intervals.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero.
    pub fn new<N: Into<String>>(name: N, size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::EmptyWindow);
        }

        let name = name.into();
        debug!(name = %name, size, "Created accumulator.");

        Ok(Accumulator {
            name,
            slots: vec![Slot::default(); size + 1].into_boxed_slice(),
            cursor: 0,
            total_ticks: 0,
        })
    }

    /// Gets the name of this accumulator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the number of closed intervals this accumulator remembers.
    pub fn size(&self) -> usize {
        self.slots.len() - 1
    }

    /// Gets the number of ticks since creation or the last reset.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Adds `value` to the open interval.
    ///
    /// The interval sum saturates at `u64::MAX`.
    pub fn add(&mut self, value: u64) {
        let slot = &mut self.slots[self.cursor];
        slot.sum = slot.sum.saturating_add(value);
        slot.updates = slot.updates.saturating_add(1);
    }

    /// Closes the open interval and opens a new one.
    ///
    /// The new interval reuses the slot of the oldest remembered interval, which is discarded.
    pub fn tick(&mut self) {
        self.cursor = (self.cursor + 1) % self.slots.len();
        self.slots[self.cursor] = Slot::default();
        self.total_ticks = self.total_ticks.saturating_add(1);
        trace!(name = %self.name, total_ticks = self.total_ticks, "Advanced accumulator interval.");
    }

    /// Clears every interval and rewinds the accumulator to its initial state.
    pub fn reset(&mut self) {
        self.slots.fill(Slot::default());
        self.cursor = 0;
        self.total_ticks = 0;
        debug!(name = %self.name, "Reset accumulator.");
    }

    /// Gets the sum of the most recently closed interval.
    ///
    /// Returns zero if no interval has been closed yet.
    pub fn peek_sum(&self) -> u64 {
        self.last_closed().sum
    }

    /// Gets the average of the most recently closed interval.
    ///
    /// # Errors
    ///
    /// Returns [`NoDataError`] if that interval received no updates, or if no interval has been
    /// closed yet.
    pub fn peek_average(&self) -> Result<u64, NoDataError> {
        let slot = self.last_closed();
        if slot.updates == 0 {
            return Err(NoDataError);
        }
        Ok(slot.sum / slot.updates)
    }

    /// Gets the sum of each remembered interval, divided by `divider`.
    ///
    /// A `divider` of zero is treated as one.
    pub fn sum_window(&self, divider: u64) -> WindowSnapshot {
        self.window(WindowMode::Sum, divider)
    }

    /// Gets the average of each remembered interval, divided by `divider`.
    ///
    /// A `divider` of zero is treated as one.
    pub fn average_window(&self, divider: u64) -> WindowSnapshot {
        self.window(WindowMode::Average, divider)
    }

    /// Gets a snapshot of the remembered intervals, oldest first.
    ///
    /// The window covers at most [`size`](Accumulator::size) intervals, and fewer if the
    /// accumulator has not ticked that many times since creation or the last reset.
    pub fn window(&self, mode: WindowMode, divider: u64) -> WindowSnapshot {
        let divider = divider.max(1);
        let covered = (self.size() as u64).min(self.total_ticks) as usize;
        let len = self.slots.len();

        let mut snapshot =
            WindowSnapshot { results: Vec::with_capacity(covered), ..Default::default() };
        for age in (1..=covered).rev() {
            let slot = self.slots[(self.cursor + len - age) % len];
            if slot.updates == 0 {
                snapshot.results.push(0);
                continue;
            }

            let value = match mode {
                WindowMode::Sum => slot.sum / divider,
                WindowMode::Average => slot.sum / divider.saturating_mul(slot.updates),
            };

            snapshot.nonzero = true;
            snapshot.max = snapshot.max.max(value);
            snapshot.max_window = snapshot.max_window.max(slot.sum);
            snapshot.results.push(value);
        }

        snapshot
    }

    /// Renders a snapshot of the remembered intervals as text.
    ///
    /// If no remembered interval received an update, the no-data template of `format` is used.
    pub fn render(&self, mode: WindowMode, divider: u64, format: &WindowFormat) -> String {
        let snapshot = self.window(mode, divider);
        format.render(&self.name, self.size(), &snapshot)
    }

    fn last_closed(&self) -> &Slot {
        let len = self.slots.len();
        &self.slots[(self.cursor + len - 1) % len]
    }
}

#[cfg(test)]
mod tests {
    use super::{Accumulator, WindowMode, WindowSnapshot};
    use crate::error::{ConfigError, NoDataError};
    use quickcheck_macros::quickcheck;

    fn scenario() -> Accumulator {
        let mut acc = Accumulator::new("requests", 3).unwrap();
        acc.add(10);
        acc.tick();
        acc.add(20);
        acc.add(5);
        acc.tick();
        acc
    }

    #[test]
    fn test_zero_size() {
        assert_eq!(Accumulator::new("empty", 0).unwrap_err(), ConfigError::EmptyWindow);
    }

    #[test]
    fn test_sum_window() {
        let acc = scenario();
        assert_eq!(
            acc.sum_window(1),
            WindowSnapshot { results: vec![10, 25], nonzero: true, max: 25, max_window: 25 }
        );
    }

    #[test]
    fn test_average_window() {
        let acc = scenario();
        assert_eq!(
            acc.average_window(1),
            WindowSnapshot { results: vec![10, 12], nonzero: true, max: 12, max_window: 25 }
        );
    }

    #[test]
    fn test_divider() {
        let acc = scenario();
        assert_eq!(acc.sum_window(5).results, vec![2, 5]);
        assert_eq!(acc.average_window(2).results, vec![5, 6]);
        assert_eq!(acc.sum_window(0), acc.sum_window(1));
        assert_eq!(acc.average_window(0), acc.average_window(1));
    }

    #[test]
    fn test_open_interval_is_not_read() {
        let mut acc = scenario();
        acc.add(1_000);
        assert_eq!(acc.sum_window(1).results, vec![10, 25]);
        assert_eq!(acc.peek_sum(), 25);
    }

    #[test]
    fn test_window_grows_until_size() {
        let mut acc = Accumulator::new("ticks", 4).unwrap();
        assert!(acc.sum_window(1).results.is_empty());

        for n in 1..=4 {
            acc.add(n);
            acc.tick();
            assert_eq!(acc.sum_window(1).results.len(), n as usize);
        }

        acc.add(5);
        acc.tick();
        assert_eq!(acc.sum_window(1).results, vec![2, 3, 4, 5]);
        assert_eq!(acc.total_ticks(), 5);
    }

    #[test]
    fn test_wraparound_discards_oldest() {
        let mut acc = Accumulator::new("wrap", 2).unwrap();
        for value in 1..=10 {
            acc.add(value);
            acc.tick();
        }
        assert_eq!(acc.sum_window(1).results, vec![9, 10]);
        assert_eq!(acc.peek_sum(), 10);
    }

    #[test]
    fn test_single_interval_window() {
        let mut acc = Accumulator::new("single", 1).unwrap();
        acc.add(7);
        acc.add(9);
        acc.tick();
        acc.add(100);
        assert_eq!(acc.sum_window(1).results, vec![16]);
        assert_eq!(acc.peek_sum(), 16);
        assert_eq!(acc.peek_average(), Ok(8));
    }

    #[test]
    fn test_empty_intervals() {
        let mut acc = Accumulator::new("sparse", 4).unwrap();
        acc.tick();
        acc.add(30);
        acc.tick();
        acc.tick();

        let sums = acc.sum_window(1);
        assert_eq!(sums.results, vec![0, 30, 0]);
        assert!(sums.nonzero);
        assert_eq!(sums.max, 30);

        assert_eq!(acc.peek_sum(), 0);
        assert_eq!(acc.peek_average(), Err(NoDataError));

        let mut idle = Accumulator::new("idle", 2).unwrap();
        idle.tick();
        assert_eq!(
            idle.average_window(1),
            WindowSnapshot { results: vec![0], nonzero: false, max: 0, max_window: 0 }
        );
    }

    #[test]
    fn test_peek_before_first_tick() {
        let mut acc = Accumulator::new("fresh", 3).unwrap();
        acc.add(5);
        assert_eq!(acc.peek_sum(), 0);
        assert_eq!(acc.peek_average(), Err(NoDataError));
    }

    #[test]
    fn test_reset() {
        let mut acc = scenario();
        acc.add(3);
        acc.reset();

        assert_eq!(acc.total_ticks(), 0);
        assert_eq!(acc.peek_sum(), 0);
        assert_eq!(acc.sum_window(1), WindowSnapshot::default());

        acc.add(4);
        acc.tick();
        assert_eq!(acc.sum_window(1).results, vec![4]);
    }

    #[test]
    fn test_saturation() {
        let mut acc = Accumulator::new("huge", 1).unwrap();
        acc.add(u64::MAX);
        acc.add(u64::MAX);
        acc.tick();
        assert_eq!(acc.peek_sum(), u64::MAX);
        assert_eq!(acc.window(WindowMode::Average, 1).results, vec![u64::MAX / 2]);
        assert_eq!(acc.window(WindowMode::Average, u64::MAX).results, vec![1]);
    }

    #[quickcheck]
    fn sum_window_adds_up(intervals: Vec<Vec<u32>>, size: u8) -> bool {
        let size = usize::from(size % 16) + 1;
        let mut acc = Accumulator::new("qc", size).unwrap();
        for interval in &intervals {
            for value in interval {
                acc.add(u64::from(*value));
            }
            acc.tick();
        }

        let remembered = &intervals[intervals.len().saturating_sub(size)..];
        let expected: u64 = remembered.iter().flatten().map(|v| u64::from(*v)).sum();
        let snapshot = acc.sum_window(1);

        snapshot.results.len() == remembered.len()
            && snapshot.results.iter().sum::<u64>() == expected
            && snapshot.nonzero == remembered.iter().any(|interval| !interval.is_empty())
    }
}
