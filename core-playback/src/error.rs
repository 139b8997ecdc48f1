//! # Playback Error Types
//!
//! Almost nothing in the coordinator is allowed to fail loudly: stop-callback
//! failures, not-ready players and unknown ids are contained where they happen.
//! What remains are caller mistakes (an empty id, an inconsistent config) and
//! bridge/runtime errors surfaced while constructing the core.

use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Player ids must be non-empty.
    #[error("Invalid player id: {0:?}")]
    InvalidPlayerId(String),

    /// The id is not managed by this scheduler.
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    /// Configuration values are inconsistent.
    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),
}

impl PlaybackError {
    /// Returns `true` if the operation may succeed when retried shortly.
    pub fn is_transient(&self) -> bool {
        matches!(self, PlaybackError::Bridge(err) if err.is_transient())
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
