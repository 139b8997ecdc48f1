//! Time-related abstractions.
//!
//! Re-exports the monotonic [`Instant`] and [`Duration`] used by clock
//! implementations, plus an async `sleep` for hosts that drive the visibility
//! scheduler from a timer task.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let elapsed = start.elapsed();
//! assert!(elapsed < Duration::from_secs(60));
//! ```

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
pub use tokio::time::{sleep, sleep_until};

/// Milliseconds elapsed since `origin`, saturating at `u64::MAX`.
pub fn millis_since(origin: Instant) -> u64 {
    u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX)
}
