//! Audio ownership tests for `PlaybackCoordinator`.
//!
//! This test suite verifies:
//! - Single owner across hand-offs
//! - Stop callback ordering and counts
//! - Idempotent unregister and sweep completeness
//! - Containment of failing and panicking callbacks
//! - Re-entrant callbacks

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BridgeError, PlayerKind, StopFn, Stoppable};
use core_playback::{OwnershipOutcome, PlaybackCoordinator, PlayerId};
use core_runtime::events::{
    EventBus, EventStream, MediaEvent, OwnershipEvent, RegistryEvent, ReleaseReason,
};
use mockall::{mock, Sequence};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

mock! {
    pub Stop {}

    impl Stoppable for Stop {
        fn stop(&self) -> BridgeResult<()>;
    }
}

fn id(value: &str) -> PlayerId {
    PlayerId::new(value).unwrap()
}

fn counter() -> (Arc<dyn Stoppable>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&calls);
    let stop = StopFn::shared(move || {
        inner.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (stop, calls)
}

// ============================================================================
// Hand-off
// ============================================================================

#[test]
fn test_hand_off_between_three_players() {
    let coordinator = PlaybackCoordinator::new();
    let (a, a_calls) = counter();
    let (b, b_calls) = counter();
    let (c, c_calls) = counter();
    coordinator.register_player("a", PlayerKind::Audio, a).unwrap();
    coordinator.register_player("b", PlayerKind::Audio, b).unwrap();
    coordinator.register_player("c", PlayerKind::Video, c).unwrap();

    assert_eq!(
        coordinator.request_playback("a"),
        OwnershipOutcome::Granted { previous: None }
    );
    assert_eq!(
        coordinator.request_playback("b"),
        OwnershipOutcome::Granted {
            previous: Some(id("a"))
        }
    );
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(coordinator.active_audio(), Some(id("b")));

    assert_eq!(
        coordinator.request_playback("c"),
        OwnershipOutcome::Granted {
            previous: Some(id("b"))
        }
    );
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    assert_eq!(c_calls.load(Ordering::SeqCst), 0);
    assert_eq!(coordinator.active_audio(), Some(id("c")));
}

#[test]
fn test_register_request_unregister_request_scenario() {
    let coordinator = PlaybackCoordinator::new();
    let mut a = MockStop::new();
    a.expect_stop().times(1).returning(|| Ok(()));
    let mut b = MockStop::new();
    b.expect_stop().never();
    let mut c = MockStop::new();
    c.expect_stop().never();

    coordinator.register_player("a", PlayerKind::Audio, Arc::new(a)).unwrap();
    coordinator.register_player("b", PlayerKind::Audio, Arc::new(b)).unwrap();
    coordinator.register_player("c", PlayerKind::Audio, Arc::new(c)).unwrap();

    coordinator.request_playback("a");
    assert_eq!(coordinator.active_audio(), Some(id("a")));

    coordinator.request_playback("b");
    assert_eq!(coordinator.active_audio(), Some(id("b")));

    coordinator.unregister_player("b");
    assert!(coordinator.active_audio().is_none());

    assert_eq!(
        coordinator.request_playback("c"),
        OwnershipOutcome::Granted { previous: None }
    );
    assert_eq!(coordinator.active_audio(), Some(id("c")));
}

#[test]
fn test_previous_owner_stopped_exactly_once_in_order() {
    let coordinator = PlaybackCoordinator::new();
    let mut seq = Sequence::new();

    let mut first = MockStop::new();
    first
        .expect_stop()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));
    let mut second = MockStop::new();
    second
        .expect_stop()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));
    let mut third = MockStop::new();
    third.expect_stop().never();

    coordinator
        .register_player("first", PlayerKind::Audio, Arc::new(first))
        .unwrap();
    coordinator
        .register_player("second", PlayerKind::Audio, Arc::new(second))
        .unwrap();
    coordinator
        .register_player("third", PlayerKind::Video, Arc::new(third))
        .unwrap();

    coordinator.request_playback("first");
    coordinator.request_playback("second");
    coordinator.request_playback("second");
    coordinator.request_playback("third");
}

#[test]
fn test_unknown_request_is_harmless() {
    let coordinator = PlaybackCoordinator::new();
    let mut owner = MockStop::new();
    owner.expect_stop().never();
    coordinator
        .register_player("owner", PlayerKind::Audio, Arc::new(owner))
        .unwrap();
    coordinator.request_playback("owner");

    assert_eq!(
        coordinator.request_playback("unmounted"),
        OwnershipOutcome::UnknownPlayer
    );
    assert_eq!(coordinator.active_audio(), Some(id("owner")));
}

// ============================================================================
// Unregister
// ============================================================================

#[test]
fn test_unregister_is_idempotent() {
    let coordinator = PlaybackCoordinator::new();
    let (a, calls) = counter();
    coordinator.register_player("a", PlayerKind::Audio, a).unwrap();
    coordinator.request_playback("a");

    assert!(coordinator.unregister_player("a"));
    assert!(!coordinator.unregister_player("a"));
    assert!(!coordinator.unregister_player("never-registered"));

    assert!(coordinator.active_audio().is_none());
    assert_eq!(coordinator.registered_count(), 0);
    // Unregistering is the player's own teardown; it is not stopped again.
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unregistered_owner_is_not_stopped_on_next_request() {
    let coordinator = PlaybackCoordinator::new();
    let (a, a_calls) = counter();
    let (b, _) = counter();
    coordinator.register_player("a", PlayerKind::Audio, a).unwrap();
    coordinator.register_player("b", PlayerKind::Audio, b).unwrap();

    coordinator.request_playback("a");
    coordinator.unregister_player("a");

    assert_eq!(
        coordinator.request_playback("b"),
        OwnershipOutcome::Granted { previous: None }
    );
    assert_eq!(a_calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Sweep
// ============================================================================

#[test]
fn test_stop_all_stops_everyone_and_clears() {
    let coordinator = PlaybackCoordinator::new();
    let counters: Vec<Arc<AtomicUsize>> = ["voice-1", "voice-2", "reel-3", "reel-4"]
        .into_iter()
        .map(|player| {
            let (stop, calls) = counter();
            coordinator
                .register_player(player, PlayerKind::Audio, stop)
                .unwrap();
            calls
        })
        .collect();
    coordinator.request_playback("reel-3");

    let report = coordinator.stop_all();

    assert_eq!(report.stopped, 4);
    assert!(report.is_clean());
    assert_eq!(report.released_owner, Some(id("reel-3")));
    for calls in &counters {
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
    assert_eq!(coordinator.registered_count(), 0);
    assert!(coordinator.active_audio().is_none());

    let empty = coordinator.stop_all();
    assert_eq!(empty.stopped, 0);
}

#[test]
fn test_stop_all_survives_failing_and_panicking_callbacks() {
    let coordinator = PlaybackCoordinator::new();
    let (ok_before, before_calls) = counter();
    let (ok_after, after_calls) = counter();

    coordinator
        .register_player("a-ok", PlayerKind::Audio, ok_before)
        .unwrap();
    coordinator
        .register_player(
            "b-error",
            PlayerKind::Audio,
            StopFn::shared(|| Err(BridgeError::Disposed("b-error".into()))),
        )
        .unwrap();
    coordinator
        .register_player(
            "c-panic",
            PlayerKind::Video,
            StopFn::shared(|| panic!("native player already released")),
        )
        .unwrap();
    coordinator
        .register_player("d-ok", PlayerKind::Video, ok_after)
        .unwrap();

    let report = coordinator.stop_all();

    assert_eq!(report.stopped, 4);
    assert_eq!(report.failed, vec![id("b-error"), id("c-panic")]);
    assert_eq!(before_calls.load(Ordering::SeqCst), 1);
    assert_eq!(after_calls.load(Ordering::SeqCst), 1);
    assert_eq!(coordinator.registered_count(), 0);
}

#[test]
fn test_panicking_stop_does_not_block_hand_off() {
    let coordinator = PlaybackCoordinator::new();
    coordinator
        .register_player(
            "a",
            PlayerKind::Audio,
            StopFn::shared(|| panic!("boom")),
        )
        .unwrap();
    let (b, _) = counter();
    coordinator.register_player("b", PlayerKind::Audio, b).unwrap();

    coordinator.request_playback("a");
    let outcome = coordinator.request_playback("b");

    assert!(outcome.is_owner());
    assert_eq!(coordinator.active_audio(), Some(id("b")));
}

// ============================================================================
// Re-entrancy
// ============================================================================

#[test]
fn test_stop_callback_may_unregister_itself() {
    let coordinator = PlaybackCoordinator::new();
    let handle = coordinator.clone();
    coordinator
        .register_player(
            "voice-note",
            PlayerKind::Audio,
            StopFn::shared(move || {
                handle.unregister_player("voice-note");
                Ok(())
            }),
        )
        .unwrap();
    let (reel, _) = counter();
    coordinator
        .register_player("reel", PlayerKind::Video, reel)
        .unwrap();

    coordinator.request_playback("voice-note");
    let outcome = coordinator.request_playback("reel");

    assert_eq!(
        outcome,
        OwnershipOutcome::Granted {
            previous: Some(id("voice-note"))
        }
    );
    assert!(!coordinator.is_registered("voice-note"));
    assert_eq!(coordinator.active_audio(), Some(id("reel")));
}

#[test]
fn test_requester_unregistered_during_hand_off_is_not_granted() {
    let coordinator = PlaybackCoordinator::new();
    let handle = coordinator.clone();
    coordinator
        .register_player(
            "owner",
            PlayerKind::Audio,
            StopFn::shared(move || {
                handle.unregister_player("requester");
                Ok(())
            }),
        )
        .unwrap();
    let (requester, _) = counter();
    coordinator
        .register_player("requester", PlayerKind::Video, requester)
        .unwrap();

    coordinator.request_playback("owner");
    assert_eq!(
        coordinator.request_playback("requester"),
        OwnershipOutcome::UnknownPlayer
    );
    assert!(coordinator.active_audio().is_none());
}

#[test]
fn test_stop_callback_handing_to_third_player_is_stopped_too() {
    let coordinator = PlaybackCoordinator::new();
    let handle = coordinator.clone();
    coordinator
        .register_player(
            "a",
            PlayerKind::Audio,
            StopFn::shared(move || {
                handle.request_playback("c");
                Ok(())
            }),
        )
        .unwrap();
    let (b, _) = counter();
    let (c, c_calls) = counter();
    coordinator.register_player("b", PlayerKind::Audio, b).unwrap();
    coordinator.register_player("c", PlayerKind::Audio, c).unwrap();

    coordinator.request_playback("a");
    let outcome = coordinator.request_playback("b");

    assert_eq!(
        outcome,
        OwnershipOutcome::Granted {
            previous: Some(id("c"))
        }
    );
    assert_eq!(c_calls.load(Ordering::SeqCst), 1);
    assert_eq!(coordinator.active_audio(), Some(id("b")));
}

#[test]
fn test_stop_callback_reclaiming_audio_cannot_stall_hand_off() {
    let coordinator = PlaybackCoordinator::new();
    let handle = coordinator.clone();
    let a_calls = Arc::new(AtomicUsize::new(0));
    let reclaims = Arc::clone(&a_calls);
    coordinator
        .register_player(
            "a",
            PlayerKind::Audio,
            StopFn::shared(move || {
                reclaims.fetch_add(1, Ordering::SeqCst);
                // A voice note that resumes itself whenever it is stopped.
                handle.request_playback("a");
                Ok(())
            }),
        )
        .unwrap();
    let (b, b_calls) = counter();
    coordinator.register_player("b", PlayerKind::Audio, b).unwrap();
    coordinator.request_playback("a");

    let requester = coordinator.clone();
    let outcome = thread::spawn(move || requester.request_playback("b"))
        .join()
        .unwrap();

    assert_eq!(
        outcome,
        OwnershipOutcome::Granted {
            previous: Some(id("a"))
        }
    );
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    assert_eq!(coordinator.active_audio(), Some(id("b")));
}

#[test]
fn test_stop_callbacks_handing_audio_around_a_cycle_terminate() {
    let coordinator = PlaybackCoordinator::new();
    let stops = Arc::new(AtomicUsize::new(0));

    // a hands audio to c, c hands it back to a.
    for (player, next) in [("a", "c"), ("c", "a")] {
        let handle = coordinator.clone();
        let calls = Arc::clone(&stops);
        coordinator
            .register_player(
                player,
                PlayerKind::Audio,
                StopFn::shared(move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    handle.request_playback(next);
                    Ok(())
                }),
            )
            .unwrap();
    }
    let (b, _) = counter();
    coordinator.register_player("b", PlayerKind::Audio, b).unwrap();
    coordinator.request_playback("a");

    let outcome = coordinator.request_playback("b");

    assert_eq!(
        outcome,
        OwnershipOutcome::Granted {
            previous: Some(id("a"))
        }
    );
    // One stop each for a and c; neither is stopped again.
    assert_eq!(stops.load(Ordering::SeqCst), 2);
    assert_eq!(coordinator.active_audio(), Some(id("b")));
}

#[test]
fn test_stop_all_callback_may_touch_coordinator() {
    let coordinator = PlaybackCoordinator::new();
    let handle = coordinator.clone();
    coordinator
        .register_player(
            "a",
            PlayerKind::Audio,
            StopFn::shared(move || {
                handle.unregister_player("a");
                assert_eq!(handle.registered_count(), 0);
                Ok(())
            }),
        )
        .unwrap();

    let report = coordinator.stop_all();
    assert!(report.is_clean());
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_requests_leave_one_owner() {
    let coordinator = PlaybackCoordinator::new();
    let ids: Vec<String> = (0..8).map(|n| format!("reel-{}", n)).collect();
    for player in &ids {
        let (stop, _) = counter();
        coordinator
            .register_player(player.as_str(), PlayerKind::Video, stop)
            .unwrap();
    }

    let workers: Vec<_> = ids
        .iter()
        .cloned()
        .map(|player| {
            let coordinator = coordinator.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    coordinator.request_playback(&player);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let owner = coordinator.active_audio().expect("someone owns audio");
    assert!(ids.iter().any(|player| owner == player.as_str()));
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_registry_events_reflect_lifecycle() {
    let bus = EventBus::new(32);
    let coordinator = PlaybackCoordinator::with_event_bus(bus.clone());
    let mut stream = EventStream::new(bus.subscribe()).for_player("voice-9");

    let (stop, _) = counter();
    coordinator
        .register_player("voice-9", PlayerKind::Audio, stop)
        .unwrap();
    coordinator.request_playback("voice-9");
    coordinator.unregister_player("voice-9");

    let events = stream.drain();
    assert_eq!(
        events,
        vec![
            MediaEvent::Registry(RegistryEvent::Registered {
                player_id: "voice-9".into(),
                kind: "audio".into(),
            }),
            MediaEvent::Ownership(OwnershipEvent::Granted {
                player_id: "voice-9".into(),
                previous: None,
            }),
            MediaEvent::Registry(RegistryEvent::Unregistered {
                player_id: "voice-9".into(),
            }),
            MediaEvent::Ownership(OwnershipEvent::Released {
                player_id: "voice-9".into(),
                reason: ReleaseReason::Unregistered,
            }),
        ]
    );
}

#[test]
fn test_failed_stop_is_published() {
    let bus = EventBus::new(8);
    let coordinator = PlaybackCoordinator::with_event_bus(bus.clone());
    let mut stream = EventStream::new(bus.subscribe())
        .filter(|event| matches!(event, MediaEvent::Ownership(OwnershipEvent::StopFailed { .. })));

    coordinator
        .register_player(
            "a",
            PlayerKind::Audio,
            StopFn::shared(|| Err(BridgeError::OperationFailed("decoder gone".into()))),
        )
        .unwrap();
    coordinator.stop_all();

    let events = stream.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].player_id(), Some("a"));
}
