//! # Playback Coordination Module
//!
//! Keeps feed and reel screens from talking over themselves.
//!
//! ## Overview
//!
//! This module handles:
//! - Process-wide audio ownership: at most one registered player owns audio
//!   ([`PlaybackCoordinator`])
//! - Per-screen autoplay driven by visibility and focus, with preload and
//!   retain windows ([`VisibilityScheduler`])
//! - Deterministic dwell and retry timers driven by an injected clock
//!   ([`TimerQueue`])

pub mod config;
pub mod coordinator;
pub mod error;
pub mod registry;
pub mod timer;
pub mod types;
pub mod visibility;
pub mod window;

pub use config::{PlaybackConfig, ScheduledState};
pub use coordinator::PlaybackCoordinator;
pub use error::{PlaybackError, Result};
pub use registry::{PlayerEntry, PlayerRegistry};
pub use timer::{TimerQueue, TimerToken};
pub use types::{OwnershipOutcome, PlayerId, SweepReport};
pub use visibility::{run_until_idle, ViewableItem, VisibilityScheduler};
pub use window::Placement;
