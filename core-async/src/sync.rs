//! Synchronization primitives.
//!
//! Only the channel types the workspace actually uses are re-exported. The
//! event bus is built on [`broadcast`]: sends never block, each subscriber gets
//! its own cursor, and slow subscribers observe `Lagged` instead of stalling the
//! sender. That matters here because events are emitted from inside the
//! synchronous coordinator hand-off.

pub use tokio::sync::broadcast;
