//! # Playback Coordinator
//!
//! Process-wide audio ownership. Any number of players may be registered; at
//! most one of them owns audio at a time.
//!
//! ## Hand-off
//!
//! `request_playback("b")` while `"a"` owns audio:
//!
//! ```text
//! lock ── take owner "a", clear ownership ── unlock
//!      └─> a.stop()                         (no lock held)
//! lock ── "b" still registered? grant ──── unlock
//! ```
//!
//! Stop callbacks always run without the registry lock, so a callback may
//! call back into the coordinator (typically `unregister_player` from a
//! component tearing itself down). Failures and panics inside a callback are
//! logged and contained; they never prevent the requester from being granted.
//! Neither does a callback that keeps handing audio back: every owner is
//! stopped at most once per request.
//!
//! ## Example
//!
//! ```
//! use bridge_traits::{PlayerKind, StopFn};
//! use core_playback::{OwnershipOutcome, PlaybackCoordinator};
//!
//! let coordinator = PlaybackCoordinator::new();
//! coordinator
//!     .register_player("voice-note-1", PlayerKind::Audio, StopFn::shared(|| Ok(())))
//!     .unwrap();
//!
//! assert_eq!(
//!     coordinator.request_playback("voice-note-1"),
//!     OwnershipOutcome::Granted { previous: None }
//! );
//! assert_eq!(coordinator.active_audio().unwrap(), "voice-note-1");
//! ```

use crate::error::Result;
use crate::registry::{PlayerEntry, PlayerRegistry};
use crate::types::{OwnershipOutcome, PlayerId, SweepReport};
use bridge_traits::{PlayerKind, Stoppable};
use core_runtime::config::CoreConfig;
use core_runtime::events::{
    EventBus, MediaEvent, OwnershipEvent, RegistryEvent, ReleaseReason,
};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Owners stopped by one `request_playback` before the rest are overridden.
const MAX_HANDOFF_ROUNDS: usize = 16;

enum Step {
    Stop(PlayerEntry),
    /// Ownership was taken back by a player already stopped in this call.
    Override(PlayerId),
    Granted,
}

/// Shared audio ownership coordinator.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone, Default)]
pub struct PlaybackCoordinator {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    registry: Mutex<PlayerRegistry>,
    events: Option<EventBus>,
}

impl PlaybackCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinator that publishes registry and ownership events on `events`.
    pub fn with_event_bus(events: EventBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(PlayerRegistry::new()),
                events: Some(events),
            }),
        }
    }

    /// Coordinator with an event bus sized from `config`.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::with_event_bus(config.event_bus())
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.inner.events.as_ref()
    }

    /// Registers `id`, overwriting any live entry with the same id.
    ///
    /// Registering never starts anything. If the overwritten entry owned
    /// audio, ownership is released and the stale stop callback is invoked so
    /// nothing keeps playing under a dead registration.
    ///
    /// # Errors
    ///
    /// `InvalidPlayerId` for an empty id.
    pub fn register_player(
        &self,
        id: impl Into<String>,
        kind: PlayerKind,
        stop: Arc<dyn Stoppable>,
    ) -> Result<()> {
        let id = PlayerId::new(id)?;
        let displaced = {
            let mut registry = self.inner.registry.lock();
            registry.insert(PlayerEntry::new(id.clone(), kind, stop))
        };

        debug!(player_id = %id, %kind, "Player registered");
        self.emit(MediaEvent::Registry(RegistryEvent::Registered {
            player_id: id.to_string(),
            kind: kind.to_string(),
        }));

        if let Some(displaced) = displaced {
            debug!(player_id = %id, "Replaced live registration");
            self.emit(MediaEvent::Registry(RegistryEvent::Replaced {
                player_id: id.to_string(),
            }));
            if displaced.was_active {
                self.emit_released(&id, ReleaseReason::Replaced);
                self.invoke_stop(&displaced.entry);
            }
        }

        Ok(())
    }

    /// Removes `id` from the registry. Unknown ids are a no-op.
    ///
    /// Does not call the stop callback; the caller is tearing the player down
    /// itself. Returns whether an entry was removed.
    pub fn unregister_player(&self, id: &str) -> bool {
        let removed = self.inner.registry.lock().remove(id);

        match removed {
            Some(removed) => {
                debug!(player_id = id, "Player unregistered");
                self.emit(MediaEvent::Registry(RegistryEvent::Unregistered {
                    player_id: id.to_string(),
                }));
                if removed.was_active {
                    self.emit_released(&removed.entry.id, ReleaseReason::Unregistered);
                }
                true
            }
            None => false,
        }
    }

    /// Grants audio ownership to `id`, stopping the current owner first.
    ///
    /// - Already the owner: nothing is stopped.
    /// - Not registered: nothing changes, `UnknownPlayer` is returned.
    /// - Otherwise the previous owner's stop callback runs exactly once before
    ///   `id` becomes the owner. If `id` is unregistered from inside that
    ///   callback the grant is dropped and `UnknownPlayer` is returned.
    /// - A stop callback that hands ownership on is followed; each owner is
    ///   stopped at most once per call. An owner that reclaims audio after
    ///   being stopped is overridden without another stop.
    #[instrument(skip(self))]
    pub fn request_playback(&self, id: &str) -> OwnershipOutcome {
        let mut previous: Option<PlayerId> = None;
        let mut stopped: HashSet<PlayerId> = HashSet::new();

        // Loops only when a stop callback hands ownership to another player.
        loop {
            let step = {
                let mut registry = self.inner.registry.lock();
                if !registry.contains(id) {
                    debug!("Playback requested for unregistered player");
                    return OwnershipOutcome::UnknownPlayer;
                }

                match registry.active().cloned() {
                    Some(active) if active == id => {
                        return match previous {
                            None => OwnershipOutcome::AlreadyOwner,
                            Some(previous) => OwnershipOutcome::Granted {
                                previous: Some(previous),
                            },
                        };
                    }
                    Some(active)
                        if stopped.contains(&active) || stopped.len() >= MAX_HANDOFF_ROUNDS =>
                    {
                        registry.take_active();
                        registry.set_active(id);
                        Step::Override(active)
                    }
                    Some(_) => match registry.take_active() {
                        Some(entry) => Step::Stop(entry),
                        None => continue,
                    },
                    None => {
                        registry.set_active(id);
                        Step::Granted
                    }
                }
            };

            match step {
                Step::Stop(entry) => {
                    self.emit_released(&entry.id, ReleaseReason::HandedOff);
                    self.invoke_stop(&entry);
                    stopped.insert(entry.id.clone());
                    previous = Some(entry.id);
                }
                Step::Override(active) => {
                    warn!(
                        player_id = %active,
                        rounds = stopped.len(),
                        "Stop callback kept reclaiming audio; overriding"
                    );
                    self.emit_released(&active, ReleaseReason::HandedOff);
                    previous = Some(active);
                    break;
                }
                Step::Granted => break,
            }
        }

        info!(previous = ?previous.as_ref().map(PlayerId::as_str), "Audio ownership granted");
        self.emit(MediaEvent::Ownership(OwnershipEvent::Granted {
            player_id: id.to_string(),
            previous: previous.as_ref().map(PlayerId::to_string),
        }));

        OwnershipOutcome::Granted { previous }
    }

    /// Stops every registered player and clears the registry.
    ///
    /// Used when the whole app goes to the background. Every stop callback is
    /// attempted even if earlier ones fail or panic.
    pub fn stop_all(&self) -> SweepReport {
        let (entries, released_owner) = self.inner.registry.lock().drain();

        if let Some(owner) = &released_owner {
            self.emit_released(owner, ReleaseReason::Swept);
        }

        let mut report = SweepReport {
            released_owner,
            ..SweepReport::default()
        };

        for entry in &entries {
            report.stopped += 1;
            if !self.invoke_stop(entry) {
                report.failed.push(entry.id.clone());
            }
        }

        info!(
            stopped = report.stopped,
            failed = report.failed.len(),
            "Stopped all players"
        );
        self.emit(MediaEvent::Registry(RegistryEvent::Swept {
            stopped: report.stopped,
            failed: report.failed.len(),
        }));

        report
    }

    /// Current audio owner.
    pub fn active_audio(&self) -> Option<PlayerId> {
        self.inner.registry.lock().active().cloned()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.inner.registry.lock().contains(id)
    }

    pub fn kind_of(&self, id: &str) -> Option<PlayerKind> {
        self.inner.registry.lock().get(id).map(|entry| entry.kind)
    }

    pub fn registered_count(&self) -> usize {
        self.inner.registry.lock().len()
    }

    pub fn registered_ids(&self) -> Vec<PlayerId> {
        self.inner.registry.lock().ids()
    }

    /// Runs a stop callback in isolation. Returns `false` if it failed.
    ///
    /// Must be called without the registry lock held.
    fn invoke_stop(&self, entry: &PlayerEntry) -> bool {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.stop.stop()));

        let message = match outcome {
            Ok(Ok(())) => return true,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => format!("stop callback panicked: {}", panic_message(&*payload)),
        };

        warn!(player_id = %entry.id, error = %message, "Stop callback failed");
        self.emit(MediaEvent::Ownership(OwnershipEvent::StopFailed {
            player_id: entry.id.to_string(),
            message,
        }));
        false
    }

    fn emit_released(&self, id: &PlayerId, reason: ReleaseReason) {
        debug!(player_id = %id, ?reason, "Audio ownership released");
        self.emit(MediaEvent::Ownership(OwnershipEvent::Released {
            player_id: id.to_string(),
            reason,
        }));
    }

    fn emit(&self, event: MediaEvent) {
        if let Some(events) = &self.inner.events {
            // No subscribers is fine.
            let _ = events.emit(event);
        }
    }
}

impl fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.registry.lock();
        f.debug_struct("PlaybackCoordinator")
            .field("registered", &registry.len())
            .field("active_audio", &registry.active())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{BridgeError, StopFn};
    use core_runtime::events::EventStream;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_stop() -> (Arc<dyn Stoppable>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let stop = StopFn::shared(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (stop, calls)
    }

    #[test]
    fn rejects_empty_id() {
        let coordinator = PlaybackCoordinator::new();
        let (stop, _) = counting_stop();
        assert!(coordinator
            .register_player("", PlayerKind::Audio, stop)
            .is_err());
        assert_eq!(coordinator.registered_count(), 0);
    }

    #[test]
    fn registering_does_not_grant_ownership() {
        let coordinator = PlaybackCoordinator::new();
        let (stop, calls) = counting_stop();
        coordinator
            .register_player("a", PlayerKind::Audio, stop)
            .unwrap();

        assert!(coordinator.is_registered("a"));
        assert_eq!(coordinator.kind_of("a"), Some(PlayerKind::Audio));
        assert!(coordinator.active_audio().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn repeated_request_is_a_no_op() {
        let coordinator = PlaybackCoordinator::new();
        let (stop, calls) = counting_stop();
        coordinator
            .register_player("a", PlayerKind::Audio, stop)
            .unwrap();

        assert_eq!(
            coordinator.request_playback("a"),
            OwnershipOutcome::Granted { previous: None }
        );
        assert_eq!(
            coordinator.request_playback("a"),
            OwnershipOutcome::AlreadyOwner
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_request_leaves_owner_alone() {
        let coordinator = PlaybackCoordinator::new();
        let (stop, calls) = counting_stop();
        coordinator
            .register_player("a", PlayerKind::Audio, stop)
            .unwrap();
        coordinator.request_playback("a");

        assert_eq!(
            coordinator.request_playback("ghost"),
            OwnershipOutcome::UnknownPlayer
        );
        assert_eq!(coordinator.active_audio().unwrap(), "a");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failing_stop_still_hands_off() {
        let coordinator = PlaybackCoordinator::new();
        coordinator
            .register_player(
                "a",
                PlayerKind::Audio,
                StopFn::shared(|| Err(BridgeError::OperationFailed("decoder gone".into()))),
            )
            .unwrap();
        let (stop, _) = counting_stop();
        coordinator
            .register_player("b", PlayerKind::Video, stop)
            .unwrap();

        coordinator.request_playback("a");
        let outcome = coordinator.request_playback("b");

        assert_eq!(
            outcome,
            OwnershipOutcome::Granted {
                previous: Some(PlayerId::new("a").unwrap())
            }
        );
        assert_eq!(coordinator.active_audio().unwrap(), "b");
    }

    #[test]
    fn replacing_the_owner_stops_the_stale_entry() {
        let coordinator = PlaybackCoordinator::new();
        let (stale, stale_calls) = counting_stop();
        let (fresh, fresh_calls) = counting_stop();

        coordinator
            .register_player("reel-4", PlayerKind::Video, stale)
            .unwrap();
        coordinator.request_playback("reel-4");
        coordinator
            .register_player("reel-4", PlayerKind::Video, fresh)
            .unwrap();

        assert!(coordinator.active_audio().is_none());
        assert_eq!(stale_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fresh_calls.load(Ordering::SeqCst), 0);
        assert_eq!(coordinator.registered_count(), 1);
    }

    #[test]
    fn hand_off_publishes_events_in_order() {
        let coordinator = PlaybackCoordinator::with_event_bus(EventBus::new(16));
        let mut stream = EventStream::new(coordinator.event_bus().unwrap().subscribe())
            .filter(|event| matches!(event, MediaEvent::Ownership(_)));

        let (a, _) = counting_stop();
        let (b, _) = counting_stop();
        coordinator.register_player("a", PlayerKind::Audio, a).unwrap();
        coordinator.register_player("b", PlayerKind::Audio, b).unwrap();
        coordinator.request_playback("a");
        coordinator.request_playback("b");

        let events = stream.drain();
        assert_eq!(
            events,
            vec![
                MediaEvent::Ownership(OwnershipEvent::Granted {
                    player_id: "a".into(),
                    previous: None,
                }),
                MediaEvent::Ownership(OwnershipEvent::Released {
                    player_id: "a".into(),
                    reason: ReleaseReason::HandedOff,
                }),
                MediaEvent::Ownership(OwnershipEvent::Granted {
                    player_id: "b".into(),
                    previous: Some("a".into()),
                }),
            ]
        );
    }

    #[test]
    fn clones_share_state() {
        let coordinator = PlaybackCoordinator::new();
        let other = coordinator.clone();
        let (stop, _) = counting_stop();
        other.register_player("a", PlayerKind::Audio, stop).unwrap();
        coordinator.request_playback("a");
        assert_eq!(other.active_audio().unwrap(), "a");
        assert!(format!("{:?}", coordinator).contains("registered: 1"));
    }
}
