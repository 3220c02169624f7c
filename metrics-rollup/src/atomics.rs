//! Atomic types used for metrics storage.
//!
//! Histogram counters are always 64 bits wide, regardless of whether the standard library exposes
//! an atomic integer of that size for the target architecture. The atomic type used by this crate
//! is publicly re-exported here so callers can build their own counters that render the same way.

#[cfg(target_pointer_width = "32")]
pub use portable_atomic::AtomicU64;
#[cfg(not(target_pointer_width = "32"))]
pub use std::sync::atomic::AtomicU64;
