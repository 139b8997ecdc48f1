//! Core identifiers and result types.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque identifier of one mounted player.
///
/// Unique for the lifetime of a mount. Hosts usually derive it from a stable
/// content id plus a role tag, see [`PlayerId::scoped`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    /// # Errors
    ///
    /// `InvalidPlayerId` when `id` is empty or only whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PlaybackError::InvalidPlayerId(id));
        }
        Ok(Self(id))
    }

    /// `"<role>-<content_id>"`, e.g. `PlayerId::scoped("gossip-preview", "981")`.
    pub fn scoped(role: &str, content_id: impl fmt::Display) -> Result<Self> {
        Self::new(format!("{}-{}", role, content_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlayerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PlayerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PlayerId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl TryFrom<String> for PlayerId {
    type Error = PlaybackError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PlayerId {
    type Error = PlaybackError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

/// Result of [`PlaybackCoordinator::request_playback`](crate::PlaybackCoordinator::request_playback).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipOutcome {
    /// The caller already held audio ownership; nothing was stopped.
    AlreadyOwner,
    /// Ownership was granted after stopping `previous`, if there was one.
    Granted { previous: Option<PlayerId> },
    /// The id is not registered. Expected when an unmount races a tap.
    UnknownPlayer,
}

impl OwnershipOutcome {
    /// Whether the caller may start its player.
    pub fn is_owner(&self) -> bool {
        matches!(
            self,
            OwnershipOutcome::AlreadyOwner | OwnershipOutcome::Granted { .. }
        )
    }
}

/// Result of a [`stop_all`](crate::PlaybackCoordinator::stop_all) sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Number of stop callbacks invoked.
    pub stopped: usize,
    /// Players whose stop callback failed or panicked.
    pub failed: Vec<PlayerId>,
    /// Owner at the time of the sweep.
    pub released_owner: Option<PlayerId>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
