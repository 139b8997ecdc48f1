//! Player bridge traits.
//!
//! The core never decodes media. Host screens wrap each native audio or video
//! player in a [`PlayerHandle`] and describe how to silence it with a
//! [`Stoppable`]; the coordinator and the visibility scheduler only ever talk
//! to those two contracts.
//!
//! Every call on both traits must be safe after the native resource has been
//! torn down. A handle whose decoder is already gone treats `pause`/`dispose`
//! as no-ops and reports `Ok(())`, so sweeps over many players stay total.

use crate::{error::Result, platform::PlatformSendSync};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Kind of media a player produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Audio,
    Video,
}

impl fmt::Display for PlayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerKind::Audio => f.write_str("audio"),
            PlayerKind::Video => f.write_str("video"),
        }
    }
}

/// Capability wrapper around one native audio or video player instance.
///
/// `play` may fail with [`BridgeError::NotReady`](crate::BridgeError::NotReady)
/// while media is still loading; callers retry rather than surface it.
pub trait PlayerHandle: PlatformSendSync {
    fn kind(&self) -> PlayerKind;

    fn play(&self) -> Result<()>;

    fn pause(&self) -> Result<()>;

    fn seek(&self, position: Duration) -> Result<()>;

    /// Release the native decoder. Further calls on the handle are no-ops.
    fn dispose(&self) -> Result<()>;

    /// Whether the native layer has signalled that media is loaded.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Stop contract supplied by the component that owns a player.
///
/// `stop` must be idempotent. Asynchronous teardown started from `stop` is
/// fire-and-forget: the coordinator does not wait for it.
pub trait Stoppable: PlatformSendSync {
    fn stop(&self) -> Result<()>;
}

/// Adapts a closure to [`Stoppable`].
///
/// ```
/// use bridge_traits::player::{StopFn, Stoppable};
///
/// let stop = StopFn::new(|| Ok(()));
/// assert!(stop.stop().is_ok());
/// ```
pub struct StopFn<F>(F);

impl<F> StopFn<F>
where
    F: Fn() -> Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }

    pub fn shared(f: F) -> Arc<dyn Stoppable>
    where
        F: 'static,
    {
        Arc::new(Self(f))
    }
}

impl<F> Stoppable for StopFn<F>
where
    F: Fn() -> Result<()> + Send + Sync,
{
    fn stop(&self) -> Result<()> {
        (self.0)()
    }
}

impl<F> fmt::Debug for StopFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StopFn { .. }")
    }
}

/// Stops a player by pausing its handle.
///
/// Used when a player both renders media and owns audio, e.g. an unmuted
/// video whose ownership is revoked by another player.
pub struct PauseOnStop(pub Arc<dyn PlayerHandle>);

impl Stoppable for PauseOnStop {
    fn stop(&self) -> Result<()> {
        self.0.pause()
    }
}

impl fmt::Debug for PauseOnStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PauseOnStop").field(&self.0.kind()).finish()
    }
}
