//! # Scheduling Configuration
//!
//! Window sizes and timing for the visibility scheduler.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for retry attempts; anything above this is a misconfiguration.
const MAX_PLAY_RETRY_ATTEMPTS: u32 = 10;

/// Visibility scheduler configuration.
///
/// Distances are measured in list positions from the nearest visible player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Players within this distance stay mounted and paused, ready to start
    /// the moment they scroll into view.
    ///
    /// Default: 1.
    #[serde(default = "default_preload_radius")]
    pub preload_radius: usize,

    /// Players beyond the preload window but within this distance are kept
    /// paused. Anything further is paused and disposed.
    ///
    /// Must be `>= preload_radius`. Default: 1.
    #[serde(default = "default_retain_radius")]
    pub retain_radius: usize,

    /// Minimum visible area (percent) for an item to count as visible when
    /// the host reports viewability.
    ///
    /// Default: 20.
    #[serde(default = "default_min_visible_percent")]
    pub min_visible_percent: u8,

    /// How long a visible set must stay unchanged before it is applied.
    ///
    /// Fast scrolling produces a burst of updates; only the last one that
    /// survives the dwell period starts anything.
    ///
    /// Default: 50 ms.
    #[serde(default = "default_dwell")]
    pub dwell: Duration,

    /// Retries after a `NotReady` failure of `play()`. Zero disables retries.
    ///
    /// Default: 3.
    #[serde(default = "default_play_retry_attempts")]
    pub play_retry_attempts: u32,

    /// Base delay between retries; attempt `n` waits `n * play_retry_delay`.
    ///
    /// Default: 100 ms.
    #[serde(default = "default_play_retry_delay")]
    pub play_retry_delay: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            preload_radius: default_preload_radius(),
            retain_radius: default_retain_radius(),
            min_visible_percent: default_min_visible_percent(),
            dwell: default_dwell(),
            play_retry_attempts: default_play_retry_attempts(),
            play_retry_delay: default_play_retry_delay(),
        }
    }
}

impl PlaybackConfig {
    /// Configuration for full-screen vertical pagers.
    ///
    /// - One page either side stays preloaded
    /// - Two pages either side are retained so a quick swipe back is instant
    /// - An item must cover half the screen to count as visible
    pub fn reels() -> Self {
        Self {
            preload_radius: 1,
            retain_radius: 2,
            min_visible_percent: 50,
            dwell: Duration::from_millis(100),
            ..Default::default()
        }
    }

    /// Configuration for dense two-column grids of previews.
    ///
    /// - A full row above and below is preloaded
    /// - Small visibility threshold; previews are short and muted
    pub fn grid() -> Self {
        Self {
            preload_radius: 2,
            retain_radius: 4,
            min_visible_percent: 20,
            dwell: Duration::from_millis(50),
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.retain_radius < self.preload_radius {
            return Err(PlaybackError::InvalidConfig(
                "retain_radius cannot be smaller than preload_radius".to_string(),
            ));
        }

        if !(1..=100).contains(&self.min_visible_percent) {
            return Err(PlaybackError::InvalidConfig(
                "min_visible_percent must be between 1 and 100".to_string(),
            ));
        }

        if self.play_retry_attempts > MAX_PLAY_RETRY_ATTEMPTS {
            return Err(PlaybackError::InvalidConfig(format!(
                "play_retry_attempts cannot exceed {}",
                MAX_PLAY_RETRY_ATTEMPTS
            )));
        }

        if self.play_retry_attempts > 0 && self.play_retry_delay.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "play_retry_delay must be > 0 when retries are enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.play_retry_delay.saturating_mul(attempt.max(1))
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_preload_radius() -> usize {
    1
}

fn default_retain_radius() -> usize {
    1
}

fn default_min_visible_percent() -> u8 {
    20
}

fn default_dwell() -> Duration {
    Duration::from_millis(50)
}

fn default_play_retry_attempts() -> u32 {
    3
}

fn default_play_retry_delay() -> Duration {
    Duration::from_millis(100)
}

// ============================================================================
// Scheduled State
// ============================================================================

/// Where the scheduler believes a managed player is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScheduledState {
    /// Managed but never started.
    Mounted,
    /// `play()` succeeded.
    Playing,
    /// Stopped by the scheduler or by losing audio ownership.
    Paused,
    /// Should play, but the native layer has not reported ready.
    AwaitingReady,
    /// `play()` reported not-ready; retry `attempt` is armed.
    Retrying { attempt: u32 },
    /// Outside the retain window; the decoder has been released.
    Disposed,
}

impl ScheduledState {
    /// Returns `true` if the scheduler has asked the player to run.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::Retrying { .. })
    }

    /// Returns `true` once the decoder is gone; only a remount revives it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Disposed)
    }
}
