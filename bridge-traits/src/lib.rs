//! # Host Bridge Traits
//!
//! Contracts that host screens implement so the playback core can drive native
//! media without knowing how it is decoded or rendered.
//!
//! ## Traits
//!
//! ### Playback
//! - [`PlayerHandle`](player::PlayerHandle) - play/pause/seek/dispose over one native player
//! - [`Stoppable`](player::Stoppable) - how a component silences its player when it loses audio ownership
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should report a still-loading player as `NotReady` (retried by the core) and
//! treat calls on an already-released resource as successful no-ops.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single coordinator instance can
//! be shared across screens behind an `Arc`.
//!
//! ## Examples
//!
//! ```
//! use bridge_traits::player::{PlayerHandle, PlayerKind};
//! use bridge_traits::error::Result;
//! use std::time::Duration;
//!
//! struct VoiceNote;
//!
//! impl PlayerHandle for VoiceNote {
//!     fn kind(&self) -> PlayerKind { PlayerKind::Audio }
//!     fn play(&self) -> Result<()> { Ok(()) }
//!     fn pause(&self) -> Result<()> { Ok(()) }
//!     fn seek(&self, _position: Duration) -> Result<()> { Ok(()) }
//!     fn dispose(&self) -> Result<()> { Ok(()) }
//! }
//!
//! assert!(VoiceNote.is_ready());
//! ```

pub mod error;
pub mod platform;
pub mod player;
pub mod time;

pub use error::BridgeError;

pub use player::{PauseOnStop, PlayerHandle, PlayerKind, StopFn, Stoppable};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, ManualClock, MemoryLogSink, SystemClock};
