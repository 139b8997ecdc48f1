//! # Event Bus System
//!
//! Broadcasts what the playback core decides (who owns audio, which players a
//! screen is playing, what got swept) so host screens can update UI affordances
//! such as a "now playing" indicator without polling the coordinator.
//!
//! ## Overview
//!
//! - **Event Types**: [`MediaEvent`] wraps three domains: registry bookkeeping,
//!   audio ownership hand-offs, and visibility-driven scheduling.
//! - **EventBus**: broadcast channel that the coordinator and scheduler publish on.
//! - **EventStream**: receiver wrapper with optional filtering.
//!
//! ```text
//! ┌─────────────────────┐  emit   ┌───────────┐ subscribe ┌──────────────┐
//! │ PlaybackCoordinator ├────────>│           ├──────────>│ Now-playing  │
//! └─────────────────────┘         │ EventBus  │           │ indicator    │
//! ┌─────────────────────┐  emit   │           │ subscribe ┌──────────────┐
//! │ VisibilityScheduler ├────────>│           ├──────────>│ Debug overlay│
//! └─────────────────────┘         └───────────┘           └──────────────┘
//! ```
//!
//! Emission happens synchronously inside coordinator calls. Sends never block;
//! a bus without subscribers simply drops the event.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, MediaEvent, OwnershipEvent};
//!
//! let bus = EventBus::new(32);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(MediaEvent::Ownership(OwnershipEvent::Granted {
//!     player_id: "voice-note-7".to_string(),
//!     previous: None,
//! }))
//! .ok();
//!
//! assert!(stream.try_recv().is_ok());
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; keep reading.
//! - **`RecvError::Closed`**: every sender is gone; the subscriber should exit.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// A fast fling can settle visibility for a dozen players at once; the buffer
/// holds several such bursts before slow subscribers start lagging.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 128;

// ============================================================================
// Media Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum MediaEvent {
    /// Players entering and leaving the coordinator registry
    Registry(RegistryEvent),
    /// Audio ownership changes
    Ownership(OwnershipEvent),
    /// Visibility and focus driven scheduling
    Visibility(VisibilityEvent),
}

impl MediaEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            MediaEvent::Registry(e) => e.description(),
            MediaEvent::Ownership(e) => e.description(),
            MediaEvent::Visibility(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            MediaEvent::Ownership(OwnershipEvent::StopFailed { .. }) => EventSeverity::Warning,
            MediaEvent::Visibility(VisibilityEvent::PlaybackAbandoned { .. }) => {
                EventSeverity::Warning
            }
            MediaEvent::Registry(RegistryEvent::Swept { failed, .. }) if *failed > 0 => {
                EventSeverity::Warning
            }
            MediaEvent::Ownership(OwnershipEvent::Granted { .. })
            | MediaEvent::Registry(RegistryEvent::Swept { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }

    /// Player the event concerns, when it concerns exactly one.
    pub fn player_id(&self) -> Option<&str> {
        match self {
            MediaEvent::Registry(RegistryEvent::Registered { player_id, .. })
            | MediaEvent::Registry(RegistryEvent::Replaced { player_id })
            | MediaEvent::Registry(RegistryEvent::Unregistered { player_id })
            | MediaEvent::Ownership(OwnershipEvent::Granted { player_id, .. })
            | MediaEvent::Ownership(OwnershipEvent::Released { player_id, .. })
            | MediaEvent::Ownership(OwnershipEvent::StopFailed { player_id, .. })
            | MediaEvent::Visibility(VisibilityEvent::Playing { player_id })
            | MediaEvent::Visibility(VisibilityEvent::Paused { player_id })
            | MediaEvent::Visibility(VisibilityEvent::Disposed { player_id })
            | MediaEvent::Visibility(VisibilityEvent::RetryScheduled { player_id, .. })
            | MediaEvent::Visibility(VisibilityEvent::PlaybackAbandoned { player_id, .. }) => {
                Some(player_id.as_str())
            }
            MediaEvent::Registry(RegistryEvent::Swept { .. })
            | MediaEvent::Visibility(VisibilityEvent::Settled { .. })
            | MediaEvent::Visibility(VisibilityEvent::FocusChanged { .. }) => None,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Registry Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    /// A player registered with the coordinator.
    Registered {
        player_id: String,
        /// `audio` or `video`
        kind: String,
    },
    /// A registration overwrote a live entry with the same id.
    Replaced { player_id: String },
    /// A player left the registry.
    Unregistered { player_id: String },
    /// Every registered player was stopped and the registry cleared.
    Swept { stopped: usize, failed: usize },
}

impl RegistryEvent {
    fn description(&self) -> &str {
        match self {
            RegistryEvent::Registered { .. } => "Player registered",
            RegistryEvent::Replaced { .. } => "Stale player registration replaced",
            RegistryEvent::Unregistered { .. } => "Player unregistered",
            RegistryEvent::Swept { .. } => "All players stopped",
        }
    }
}

// ============================================================================
// Ownership Events
// ============================================================================

/// Why a player lost audio ownership.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseReason {
    /// Another player requested playback.
    HandedOff,
    /// The owner unregistered.
    Unregistered,
    /// The owner's id was registered again by a fresh mount.
    Replaced,
    /// A sweep stopped every player.
    Swept,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum OwnershipEvent {
    /// A player was granted audio ownership.
    Granted {
        player_id: String,
        /// The owner that was stopped to make room, if any.
        previous: Option<String>,
    },
    /// A player lost audio ownership without a new owner being granted yet.
    Released {
        player_id: String,
        reason: ReleaseReason,
    },
    /// A stop callback failed; the failure was contained.
    StopFailed { player_id: String, message: String },
}

impl OwnershipEvent {
    fn description(&self) -> &str {
        match self {
            OwnershipEvent::Granted { .. } => "Audio ownership granted",
            OwnershipEvent::Released { .. } => "Audio ownership released",
            OwnershipEvent::StopFailed { .. } => "Stop callback failed",
        }
    }
}

// ============================================================================
// Visibility Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum VisibilityEvent {
    /// The visible set stayed stable for the dwell period and was applied.
    Settled { visible: Vec<String> },
    /// The owning screen gained or lost navigation focus.
    FocusChanged { focused: bool },
    Playing { player_id: String },
    Paused { player_id: String },
    /// The player left the retain window and its decoder was released.
    Disposed { player_id: String },
    /// `play()` reported not-ready; another attempt is armed.
    RetryScheduled { player_id: String, attempt: u32 },
    /// Retries ran out; the player stays paused.
    PlaybackAbandoned { player_id: String, attempts: u32 },
}

impl VisibilityEvent {
    fn description(&self) -> &str {
        match self {
            VisibilityEvent::Settled { .. } => "Visible set settled",
            VisibilityEvent::FocusChanged { .. } => "Screen focus changed",
            VisibilityEvent::Playing { .. } => "Player started",
            VisibilityEvent::Paused { .. } => "Player paused",
            VisibilityEvent::Disposed { .. } => "Player disposed",
            VisibilityEvent::RetryScheduled { .. } => "Play retry scheduled",
            VisibilityEvent::PlaybackAbandoned { .. } => "Autoplay abandoned",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to media events.
///
/// Cloning the bus clones the sender; every clone publishes to the same
/// subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MediaEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when nobody is listening.
    pub fn emit(&self, event: MediaEvent) -> Result<usize, SendError<MediaEvent>> {
        self.sender.send(event)
    }

    /// Creates a receiver for all future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<MediaEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&MediaEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional filter.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, MediaEvent};
///
/// let bus = EventBus::default();
/// let ownership_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, MediaEvent::Ownership(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<MediaEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<MediaEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv`/`try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&MediaEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Only events about `player_id` are returned.
    pub fn for_player(self, player_id: impl Into<String>) -> Self {
        let player_id = player_id.into();
        self.filter(move |event| event.player_id() == Some(player_id.as_str()))
    }

    fn accepts(&self, event: &MediaEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<MediaEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Receives a buffered event without waiting. `None` when nothing matching is buffered.
    pub fn try_recv(&mut self) -> Option<Result<MediaEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every buffered event that passes the filter.
    pub fn drain(&mut self) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            match result {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
