//! Runtime facade for the feedplay crates.
//!
//! The coordinator itself is synchronous, but the ambient infrastructure around
//! it (event broadcasting, forwarding logs to a host sink, timestamps for the
//! system clock) needs a handful of runtime primitives. Every crate in the
//! workspace reaches those through this crate instead of naming Tokio directly,
//! so the executor can be swapped in one place.
//!
//! # Modules
//!
//! - `runtime`: blocking entry point and access to the ambient runtime handle
//! - `sync`: broadcast channels used by the event bus
//! - `time`: monotonic instants and durations
//!
//! # Examples
//!
//! ```rust
//! use core_async::runtime;
//! use core_async::time::Duration;
//!
//! let value = runtime::block_on(async {
//!     core_async::time::sleep(Duration::from_millis(1)).await;
//!     7
//! })
//! .unwrap();
//! assert_eq!(value, 7);
//! ```

pub mod runtime;
pub mod sync;
pub mod time;

pub use time::{sleep, Duration, Instant};
