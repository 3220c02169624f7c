//! Composing several metrics into a single exposition block.
//!
//! A service typically keeps its metrics as fields of one stats struct: some plain counters, some
//! histograms. [`PrometheusRender`] is the capability a field type implements to render itself
//! under a given name, and [`StructureWriter`] strings those fields together in order.
//!
//! ```rust
//! # use metrics_rollup::{Histogram, StructureWriter};
//! let latency = Histogram::exponential(1, 10, 3).unwrap();
//! latency.observe(42);
//!
//! let text = StructureWriter::new()
//!     .skip(["internal_only"])
//!     .value("api_hits", "Total API calls", 17)
//!     .value("internal_only", "Never shown", 1)
//!     .field("rtt", "Round trip time", &latency)
//!     .finish();
//!
//! assert!(text.starts_with("# HELP api_hits Total API calls\n# TYPE api_hits counter\n"));
//! assert!(text.contains("api_hits 17\n"));
//! assert!(text.contains("rtt_latency_bucket{le=\"10\"} 1\n"));
//! assert!(!text.contains("internal_only"));
//! ```
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::atomics::AtomicU64;
use crate::formatting::{write_help_line, write_metric_line, write_type_line};

/// A type that can render itself in the Prometheus text exposition format.
pub trait PrometheusRender {
    /// Writes this metric to `buffer` under `name`, with `help` as its description.
    fn write_prometheus(&self, buffer: &mut String, name: &str, help: &str);

    /// Renders this metric under `name`, with `help` as its description.
    fn render(&self, name: &str, help: &str) -> String {
        let mut buffer = String::new();
        self.write_prometheus(&mut buffer, name, help);
        buffer
    }
}

/// Writes a `counter` block for a single value.
pub(crate) fn write_counter<V: Display>(buffer: &mut String, name: &str, help: &str, value: V) {
    write_help_line(buffer, name, help);
    write_type_line(buffer, name, "counter");
    write_metric_line::<u64, _>(buffer, name, None, None, value);
}

macro_rules! impl_counter_render {
    ($($ty:ty),*) => {
        $(
            impl PrometheusRender for $ty {
                fn write_prometheus(&self, buffer: &mut String, name: &str, help: &str) {
                    write_counter(buffer, name, help, self);
                }
            }
        )*
    };
}

impl_counter_render!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

macro_rules! impl_atomic_counter_render {
    ($($ty:ty),*) => {
        $(
            impl PrometheusRender for $ty {
                fn write_prometheus(&self, buffer: &mut String, name: &str, help: &str) {
                    write_counter(buffer, name, help, self.load(Ordering::Relaxed));
                }
            }
        )*
    };
}

impl_atomic_counter_render!(AtomicU32, AtomicU64, AtomicUsize);

impl<T> PrometheusRender for &T
where
    T: PrometheusRender + ?Sized,
{
    fn write_prometheus(&self, buffer: &mut String, name: &str, help: &str) {
        (**self).write_prometheus(buffer, name, help)
    }
}

impl<T> PrometheusRender for Arc<T>
where
    T: PrometheusRender + ?Sized,
{
    fn write_prometheus(&self, buffer: &mut String, name: &str, help: &str) {
        (**self).write_prometheus(buffer, name, help)
    }
}

/// Builds an exposition block out of named fields.
///
/// Fields are written in the order they are added. Any field whose name was passed to
/// [`skip`](StructureWriter::skip) is left out entirely.
#[derive(Debug, Default)]
pub struct StructureWriter {
    buffer: String,
    skipped: HashSet<String>,
}

impl StructureWriter {
    /// Creates a new, empty `StructureWriter`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Leaves out any field added under one of the given names.
    #[must_use]
    pub fn skip<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skipped.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds a field that knows how to render itself.
    #[must_use]
    pub fn field(mut self, name: &str, help: &str, metric: &dyn PrometheusRender) -> Self {
        if !self.skipped.contains(name) {
            metric.write_prometheus(&mut self.buffer, name, help);
        }
        self
    }

    /// Adds a plain value, rendered as a counter.
    #[must_use]
    pub fn value<V: Display>(mut self, name: &str, help: &str, value: V) -> Self {
        if !self.skipped.contains(name) {
            write_counter(&mut self.buffer, name, help, value);
        }
        self
    }

    /// Consumes the writer, returning the rendered text.
    pub fn finish(self) -> String {
        self.buffer
    }
}
