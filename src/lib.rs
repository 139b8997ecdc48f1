//! Workspace facade crate.
//!
//! Host applications depend on `feedplay-workspace` and get the playback
//! coordinator, its runtime infrastructure and the bridge contracts through a
//! single dependency. Each re-export is gated on the `playback` feature.

#[cfg(feature = "playback")]
pub use bridge_traits as bridge;
#[cfg(feature = "playback")]
pub use core_playback as playback;
#[cfg(feature = "playback")]
pub use core_runtime as runtime;
