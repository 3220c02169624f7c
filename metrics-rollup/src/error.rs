use thiserror::Error;

/// Errors that could occur while constructing a histogram or an accumulator.
///
/// All of these are raised at construction time. Once a histogram or accumulator exists, none of
/// its operations can fail with a configuration error.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    /// The smallest bucket bound was zero.
    #[error("bucket start must be greater than zero")]
    ZeroStart,

    /// The growth factor between buckets was not greater than one.
    #[error("bucket step must be greater than one (got {step})")]
    InvalidStep {
        /// The rejected growth factor.
        step: u64,
    },

    /// No buckets were requested.
    #[error("bucket count must be greater than zero")]
    NoBuckets,

    /// The largest bucket bound does not fit in a `u64`.
    #[error("largest bucket bound overflows u64 (start={start}, step={step}, count={count})")]
    BoundOverflow {
        /// Smallest bucket bound.
        start: u64,
        /// Growth factor between buckets.
        step: u64,
        /// Number of buckets.
        count: usize,
    },

    /// A bucket layout's bounds were not strictly ascending.
    #[error("bucket bound at index {index} is not greater than the bound before it")]
    UnorderedBounds {
        /// Index of the first bound that is not greater than its predecessor.
        index: usize,
    },

    /// An accumulator was requested with a window of zero intervals.
    #[error("accumulator window size must be greater than zero")]
    EmptyWindow,
}

/// An average was requested for an interval that received no updates.
///
/// Callers reading averaged output should check [`WindowSnapshot::nonzero`] first, or handle this
/// error from [`Accumulator::peek_average`].
///
/// [`WindowSnapshot::nonzero`]: crate::WindowSnapshot::nonzero
/// [`Accumulator::peek_average`]: crate::Accumulator::peek_average
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("no updates were recorded in the requested interval")]
pub struct NoDataError;
