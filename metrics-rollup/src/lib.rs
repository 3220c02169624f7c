//! Low-overhead, in-process metrics primitives.
//!
//! This crate provides two independent aggregation engines for instrumenting a running service:
//!
//! - [`Histogram`]: a fixed-resolution histogram with exponentially-sized buckets, updated
//!   lock-free from any number of threads and rendered in the Prometheus text exposition format.
//! - [`Accumulator`]: a fixed-size ring of time intervals that tracks per-interval sums and update
//!   counts, exposing rolling sum/average series over the most recent intervals.
//!   [`SyncAccumulator`] offers the same logic behind a mutex.
//!
//! Both are configured once at construction and then only mutated through narrow append/observe
//! operations. Neither performs I/O: serving the rendered text is left to the caller.
//!
//! # Rendering several metrics at once
//!
//! Any type implementing [`PrometheusRender`] can be composed into a single exposition block with
//! [`StructureWriter`], alongside plain values that are rendered as counters:
//!
//! ```rust
//! # use metrics_rollup::{Histogram, StructureWriter};
//! let rtt = Histogram::exponential(1, 2, 4).unwrap();
//! rtt.observe(3);
//!
//! let text = StructureWriter::new()
//!     .value("api_hits", "Total API calls", 1)
//!     .field("rtt", "Round trip time in microseconds", &rtt)
//!     .finish();
//! assert!(text.ends_with("rtt_sum 3\nrtt_count 1\n"));
//! ```
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]

mod accumulator;
pub use self::accumulator::{Accumulator, SyncAccumulator, WindowFormat, WindowMode, WindowSnapshot};

pub mod atomics;

mod buckets;
pub use self::buckets::{Buckets, ExponentialBuckets};

mod error;
pub use self::error::{ConfigError, NoDataError};

mod exposition;
pub use self::exposition::{PrometheusRender, StructureWriter};

pub mod formatting;

mod histogram;
pub use self::histogram::Histogram;
