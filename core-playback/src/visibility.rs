//! # Visibility Scheduler
//!
//! Decides which players of one scrollable screen play, stay paused, or get
//! disposed, from three inputs the host reports:
//!
//! - the visible set (debounced by `dwell`)
//! - navigation focus (applied immediately)
//! - per-player readiness
//!
//! ## Rules
//!
//! | Condition                          | Action                    |
//! |------------------------------------|---------------------------|
//! | screen not focused                 | pause everything          |
//! | visible                            | play                      |
//! | within `preload_radius`            | paused, decoder kept      |
//! | within `retain_radius`             | paused, decoder kept      |
//! | further away                       | paused, then disposed     |
//! | nothing visible                    | pause everything          |
//!
//! Audio-kind players are windowed but never autoplayed. A video marked
//! audible goes through the [`PlaybackCoordinator`] before starting; when
//! several audible videos are visible only the one with the lowest index
//! plays.
//!
//! ## Timers
//!
//! The scheduler never spawns anything. Dwell and retry deadlines are kept in
//! a [`TimerQueue`] and fire from [`poll`](VisibilityScheduler::poll):
//!
//! ```
//! use bridge_traits::ManualClock;
//! use core_playback::{PlaybackConfig, VisibilityScheduler};
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::new());
//! let mut scheduler = VisibilityScheduler::new(PlaybackConfig::default(), clock.clone()).unwrap();
//!
//! scheduler.update_visibility(["reel-6"]);
//! assert!(scheduler.visible_ids().is_empty());
//!
//! clock.advance(50);
//! assert_eq!(scheduler.poll(), 1);
//! assert_eq!(scheduler.visible_ids()[0], "reel-6");
//! ```

use crate::config::{PlaybackConfig, ScheduledState};
use crate::coordinator::PlaybackCoordinator;
use crate::error::{PlaybackError, Result};
use crate::timer::{TimerQueue, TimerToken};
use crate::types::PlayerId;
use crate::window::{self, Placement};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{Clock, PauseOnStop, PlayerHandle, PlayerKind, Stoppable};
use core_async::time::Duration;
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, MediaEvent, VisibilityEvent};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Visibility report for one list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewableItem {
    pub id: String,
    /// Visible share of the item's area, 0-100.
    pub visible_percent: u8,
}

impl ViewableItem {
    pub fn new(id: impl Into<String>, visible_percent: u8) -> Self {
        Self {
            id: id.into(),
            visible_percent,
        }
    }
}

#[derive(Debug, Clone)]
enum Deadline {
    Settle,
    Retry(PlayerId),
}

struct ManagedPlayer {
    index: usize,
    handle: Arc<dyn PlayerHandle>,
    state: ScheduledState,
    audible: bool,
    /// Set by `notify_ready`; `handle.is_ready()` is also consulted.
    ready: bool,
    /// Part of the visible set at the last reconcile.
    on_screen: bool,
    /// Lost audio ownership to another player while visible; stays paused
    /// until it scrolls out of view.
    yielded: bool,
    /// Raised by the coordinator's stop callback when audio is taken away.
    revoked: Arc<AtomicBool>,
    retry: Option<TimerToken>,
}

impl ManagedPlayer {
    fn new(index: usize, handle: Arc<dyn PlayerHandle>) -> Self {
        Self {
            index,
            handle,
            state: ScheduledState::Mounted,
            audible: false,
            ready: false,
            on_screen: false,
            yielded: false,
            revoked: Arc::new(AtomicBool::new(false)),
            retry: None,
        }
    }

    /// State as seen from outside, counting a revocation not yet absorbed.
    fn observed_state(&self) -> ScheduledState {
        if self.state.is_active() && self.revoked.load(Ordering::SeqCst) {
            ScheduledState::Paused
        } else {
            self.state
        }
    }

    fn kind(&self) -> PlayerKind {
        self.handle.kind()
    }

    fn is_ready(&self) -> bool {
        self.ready || self.handle.is_ready()
    }
}

/// Stop callback registered for an audible video.
///
/// Pauses the handle and flags the scheduler, which settles the player's
/// state the next time it runs.
struct YieldOnStop {
    pause: PauseOnStop,
    revoked: Arc<AtomicBool>,
}

impl Stoppable for YieldOnStop {
    fn stop(&self) -> BridgeResult<()> {
        self.revoked.store(true, Ordering::SeqCst);
        self.pause.stop()
    }
}

/// Per-screen autoplay scheduler.
///
/// Owned by the screen that hosts the list; not shared across threads.
pub struct VisibilityScheduler {
    config: PlaybackConfig,
    clock: Arc<dyn Clock>,
    coordinator: Option<PlaybackCoordinator>,
    events: Option<EventBus>,
    players: HashMap<PlayerId, ManagedPlayer>,
    focused: bool,
    visible: BTreeSet<PlayerId>,
    pending: Option<BTreeSet<PlayerId>>,
    settle_timer: Option<TimerToken>,
    timers: TimerQueue<Deadline>,
}

impl VisibilityScheduler {
    /// Creates a focused scheduler with nothing visible.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `config` fails validation.
    pub fn new(config: PlaybackConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            coordinator: None,
            events: None,
            players: HashMap::new(),
            focused: true,
            visible: BTreeSet::new(),
            pending: None,
            settle_timer: None,
            timers: TimerQueue::new(),
        })
    }

    /// Scheduler using the clock from `core`.
    pub fn from_config(core: &CoreConfig, config: PlaybackConfig) -> Result<Self> {
        Self::new(config, Arc::clone(&core.clock))
    }

    /// Routes audible videos through `coordinator`. Its event bus is adopted
    /// unless one was set explicitly.
    pub fn with_coordinator(mut self, coordinator: PlaybackCoordinator) -> Self {
        if self.events.is_none() {
            self.events = coordinator.event_bus().cloned();
        }
        self.coordinator = Some(coordinator);
        self
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Host inputs
    // ------------------------------------------------------------------

    /// Starts managing a mounted player at list position `index`.
    ///
    /// A live player with the same id is torn down first.
    pub fn manage_player(
        &mut self,
        id: impl Into<String>,
        index: usize,
        handle: Arc<dyn PlayerHandle>,
    ) -> Result<()> {
        let id = PlayerId::new(id)?;
        if let Some(stale) = self.players.remove(&id) {
            debug!(player_id = %id, "Replacing managed player");
            self.teardown(&id, stale);
        }

        debug!(player_id = %id, index, kind = %handle.kind(), "Managing player");
        self.players.insert(id, ManagedPlayer::new(index, handle));
        self.reconcile();
        Ok(())
    }

    /// Stops managing `id`: pauses and disposes its handle and drops it from
    /// the coordinator. Returns `false` for unknown ids.
    pub fn unmanage_player(&mut self, id: &str) -> bool {
        let Some((id, player)) = self.players.remove_entry(id) else {
            return false;
        };
        self.teardown(&id, player);
        self.reconcile();
        true
    }

    /// Marks a video as producing sound (unmuted) or not.
    ///
    /// Audible videos need audio ownership from the coordinator to play.
    pub fn mark_audible(&mut self, id: &str, audible: bool) -> Result<()> {
        let player = self
            .players
            .get_mut(id)
            .ok_or_else(|| PlaybackError::UnknownPlayer(id.to_string()))?;
        if player.audible == audible {
            return Ok(());
        }
        player.audible = audible;
        player.yielded = false;

        if !audible {
            if let Some(coordinator) = &self.coordinator {
                coordinator.unregister_player(id);
            }
        }
        self.reconcile();
        Ok(())
    }

    /// Records that the native layer finished loading `id`.
    pub fn notify_ready(&mut self, id: &str) -> Result<()> {
        let player = self
            .players
            .get_mut(id)
            .ok_or_else(|| PlaybackError::UnknownPlayer(id.to_string()))?;
        player.ready = true;
        if player.state == ScheduledState::AwaitingReady {
            player.state = ScheduledState::Mounted;
            self.reconcile();
        }
        Ok(())
    }

    /// Reports the ids currently on screen.
    ///
    /// Applied once no other report arrives for `dwell`. Ids that are not
    /// managed yet are remembered and take effect when they are mounted.
    pub fn update_visibility<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next: BTreeSet<PlayerId> = ids
            .into_iter()
            .filter_map(|id| PlayerId::new(id.as_ref()).ok())
            .collect();

        if let Some(token) = self.settle_timer.take() {
            self.timers.cancel(token);
        }
        self.pending = Some(next);

        if self.config.dwell.is_zero() {
            self.commit_visible();
            return;
        }

        let deadline = self.now() + duration_millis(self.config.dwell);
        self.settle_timer = Some(self.timers.schedule(deadline, Deadline::Settle));
    }

    /// Like [`update_visibility`](Self::update_visibility), keeping only items
    /// at or above `min_visible_percent`.
    pub fn update_viewability(&mut self, items: &[ViewableItem]) {
        let threshold = self.config.min_visible_percent;
        self.update_visibility(
            items
                .iter()
                .filter(|item| item.visible_percent >= threshold)
                .map(|item| item.id.as_str()),
        );
    }

    /// Navigation focus of the owning screen. Takes effect immediately.
    #[instrument(skip(self))]
    pub fn set_focused(&mut self, focused: bool) {
        if self.focused == focused {
            return;
        }
        self.absorb_revocations();
        self.focused = focused;
        info!("Screen focus changed");
        self.emit(VisibilityEvent::FocusChanged { focused });

        if focused {
            self.reconcile();
            return;
        }

        for id in self.ids_by_index() {
            if let Some(player) = self.players.get(&id) {
                if player.kind() == PlayerKind::Audio {
                    pause_handle(&id, player.handle.as_ref());
                    continue;
                }
            }
            self.ensure_paused(&id);
        }
    }

    /// Fires every due timer. Returns how many fired.
    pub fn poll(&mut self) -> usize {
        self.absorb_revocations();
        let due = self.timers.drain_due(self.now());
        let fired = due.len();

        for (token, deadline) in due {
            match deadline {
                Deadline::Settle => {
                    if self.settle_timer == Some(token) {
                        self.settle_timer = None;
                        self.commit_visible();
                    }
                }
                Deadline::Retry(id) => self.retry_play(&id, token),
            }
        }

        fired
    }

    /// Earliest pending deadline in clock milliseconds.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Tears down every managed player and forgets all pending work.
    pub fn shutdown(&mut self) {
        let ids = self.ids_by_index();
        for id in ids {
            if let Some(player) = self.players.remove(&id) {
                self.teardown(&id, player);
            }
        }
        self.timers.clear();
        self.settle_timer = None;
        self.pending = None;
        self.visible.clear();
        debug!("Visibility scheduler shut down");
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn state_of(&self, id: &str) -> Option<ScheduledState> {
        self.players.get(id).map(ManagedPlayer::observed_state)
    }

    /// Players the scheduler has started, in list order.
    pub fn playing_ids(&self) -> Vec<PlayerId> {
        self.ids_by_index()
            .into_iter()
            .filter(|id| {
                self.players
                    .get(id)
                    .is_some_and(|player| player.observed_state() == ScheduledState::Playing)
            })
            .collect()
    }

    /// The settled visible set.
    pub fn visible_ids(&self) -> Vec<PlayerId> {
        self.visible.iter().cloned().collect()
    }

    pub fn managed_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    // ------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------

    fn commit_visible(&mut self) {
        self.visible = self.pending.take().unwrap_or_default();
        debug!(visible = self.visible.len(), "Visible set settled");
        self.emit(VisibilityEvent::Settled {
            visible: self.visible.iter().map(PlayerId::to_string).collect(),
        });
        self.reconcile();
    }

    fn reconcile(&mut self) {
        self.absorb_revocations();
        let order = self.ids_by_index();

        if !self.focused {
            for id in &order {
                self.ensure_paused(id);
            }
            return;
        }

        let visible_indices: Vec<usize> = order
            .iter()
            .filter(|id| self.visible.contains(*id))
            .filter_map(|id| self.players.get(id).map(|player| player.index))
            .collect();

        if visible_indices.is_empty() {
            for id in &order {
                self.leave_screen(id);
                self.ensure_paused(id);
            }
            return;
        }

        // Lowest index wins when several unmuted videos are on screen.
        let audio_winner = order
            .iter()
            .find(|id| {
                self.visible.contains(*id)
                    && self.players.get(*id).is_some_and(|player| {
                        player.audible
                            && player.kind() == PlayerKind::Video
                            && !player.state.is_terminal()
                    })
            })
            .cloned();

        for id in &order {
            let Some(index) = self.players.get(id).map(|player| player.index) else {
                continue;
            };
            let placement = if self.visible.contains(id) {
                Placement::Visible
            } else {
                window::place(index, &visible_indices, &self.config)
            };
            self.apply(id, placement, audio_winner.as_ref() == Some(id));
        }
    }

    fn apply(&mut self, id: &PlayerId, placement: Placement, audio_winner: bool) {
        match placement {
            Placement::Visible => {
                let Some(player) = self.players.get_mut(id) else {
                    return;
                };
                player.on_screen = true;

                if player.kind() == PlayerKind::Audio {
                    return;
                }
                if player.audible {
                    if !audio_winner || player.yielded {
                        self.ensure_paused(id);
                        return;
                    }
                    if self.lost_ownership(id) {
                        self.yield_audio(id);
                        return;
                    }
                }
                self.start(id);
            }
            Placement::Preload | Placement::Retain => {
                self.leave_screen(id);
                self.ensure_paused(id);
            }
            Placement::Evict => self.evict(id),
        }
    }

    /// Clears the per-visit flags of a player that is no longer on screen.
    fn leave_screen(&mut self, id: &PlayerId) {
        let Some(player) = self.players.get_mut(id) else {
            return;
        };
        let was_on_screen = std::mem::replace(&mut player.on_screen, false);
        player.yielded = false;

        // Audio players are never started here, only paused as they leave.
        if was_on_screen && player.kind() == PlayerKind::Audio {
            pause_handle(id, player.handle.as_ref());
        }
    }

    /// Settles players whose stop callback ran since the scheduler last looked.
    ///
    /// The handle is already paused. A player handed off to another owner
    /// yields; one that was swept or unregistered may start again.
    fn absorb_revocations(&mut self) {
        let mut paused = Vec::new();
        for (id, player) in self.players.iter_mut() {
            if !player.revoked.swap(false, Ordering::SeqCst) || !player.state.is_active() {
                continue;
            }
            if let Some(token) = player.retry.take() {
                self.timers.cancel(token);
            }
            player.state = ScheduledState::Paused;
            let handed_off = self
                .coordinator
                .as_ref()
                .is_some_and(|coordinator| coordinator.is_registered(id.as_str()));
            if handed_off && player.on_screen {
                debug!(player_id = %id, "Audio taken by another player; staying paused");
                player.yielded = true;
            }
            paused.push(id.clone());
        }

        paused.sort();
        for id in paused {
            self.emit(VisibilityEvent::Paused {
                player_id: id.to_string(),
            });
        }
    }

    /// Whether an audible, running video has had its ownership taken away.
    fn lost_ownership(&self, id: &PlayerId) -> bool {
        let (Some(player), Some(coordinator)) = (self.players.get(id), &self.coordinator) else {
            return false;
        };
        player.state.is_active()
            && coordinator.is_registered(id.as_str())
            && coordinator.active_audio().as_ref() != Some(id)
    }

    fn yield_audio(&mut self, id: &PlayerId) {
        let Some(player) = self.players.get_mut(id) else {
            return;
        };
        debug!(player_id = %id, "Audio taken by another player; staying paused");
        player.yielded = true;
        self.ensure_paused(id);
    }

    fn start(&mut self, id: &PlayerId) {
        let Some(player) = self.players.get(id) else {
            return;
        };
        if player.state.is_terminal() {
            return;
        }

        if player.audible {
            let handle = Arc::clone(&player.handle);
            let revoked = Arc::clone(&player.revoked);
            if !self.acquire_audio(id, handle, revoked) {
                self.ensure_paused(id);
                return;
            }
        }

        let Some(player) = self.players.get_mut(id) else {
            return;
        };
        if player.state.is_active() {
            return;
        }
        if !player.is_ready() {
            debug!(player_id = %id, "Waiting for player to become ready");
            player.state = ScheduledState::AwaitingReady;
            return;
        }

        self.attempt_play(id, 0);
    }

    fn acquire_audio(
        &self,
        id: &PlayerId,
        handle: Arc<dyn PlayerHandle>,
        revoked: Arc<AtomicBool>,
    ) -> bool {
        let Some(coordinator) = &self.coordinator else {
            debug!(player_id = %id, "Audible player without coordinator; not starting");
            return false;
        };

        if !coordinator.is_registered(id.as_str()) {
            let stop = Arc::new(YieldOnStop {
                pause: PauseOnStop(handle),
                revoked,
            });
            if let Err(err) = coordinator.register_player(id.as_str(), PlayerKind::Video, stop) {
                warn!(player_id = %id, error = %err, "Failed to register audible player");
                return false;
            }
        }

        coordinator.request_playback(id.as_str()).is_owner()
    }

    /// Calls `play()`. `attempt` is the number of retries already made.
    fn attempt_play(&mut self, id: &PlayerId, attempt: u32) {
        let Some(player) = self.players.get(id) else {
            return;
        };
        let handle = Arc::clone(&player.handle);

        match handle.play() {
            Ok(()) => {
                self.set_state(id, ScheduledState::Playing);
                debug!(player_id = %id, "Playing");
                self.emit(VisibilityEvent::Playing {
                    player_id: id.to_string(),
                });
            }
            Err(err) if err.is_transient() && attempt < self.config.play_retry_attempts => {
                let next = attempt + 1;
                let deadline = self.now() + duration_millis(self.config.retry_delay(next));
                let token = self.timers.schedule(deadline, Deadline::Retry(id.clone()));
                if let Some(player) = self.players.get_mut(id) {
                    player.retry = Some(token);
                    player.state = ScheduledState::Retrying { attempt: next };
                }
                debug!(player_id = %id, attempt = next, "Player not ready; retry scheduled");
                self.emit(VisibilityEvent::RetryScheduled {
                    player_id: id.to_string(),
                    attempt: next,
                });
            }
            Err(err) if err.is_transient() => {
                self.set_state(id, ScheduledState::Paused);
                debug!(player_id = %id, attempts = attempt + 1, "Giving up on autoplay");
                self.emit(VisibilityEvent::PlaybackAbandoned {
                    player_id: id.to_string(),
                    attempts: attempt + 1,
                });
            }
            Err(err) => {
                warn!(player_id = %id, error = %err, "play() failed");
                pause_handle(id, handle.as_ref());
                self.set_state(id, ScheduledState::Paused);
            }
        }
    }

    fn retry_play(&mut self, id: &PlayerId, token: TimerToken) {
        let Some(player) = self.players.get_mut(id) else {
            return;
        };
        if player.retry != Some(token) {
            return;
        }
        player.retry = None;

        let ScheduledState::Retrying { attempt } = player.state else {
            return;
        };

        if !self.should_run(id) {
            self.set_state(id, ScheduledState::Paused);
            return;
        }
        self.attempt_play(id, attempt);
    }

    /// Re-checks, at retry time, the conditions `reconcile` started under.
    fn should_run(&self, id: &PlayerId) -> bool {
        let Some(player) = self.players.get(id) else {
            return false;
        };
        if !self.focused || !self.visible.contains(id) || player.yielded {
            return false;
        }
        if !player.audible {
            return true;
        }
        self.coordinator
            .as_ref()
            .is_some_and(|coordinator| coordinator.active_audio().as_ref() == Some(id))
    }

    fn ensure_paused(&mut self, id: &PlayerId) {
        let Some(player) = self.players.get_mut(id) else {
            return;
        };
        if let Some(token) = player.retry.take() {
            self.timers.cancel(token);
        }

        let was = player.state;
        match was {
            ScheduledState::Playing | ScheduledState::Retrying { .. } => {
                pause_handle(id, player.handle.as_ref());
                player.state = ScheduledState::Paused;
            }
            ScheduledState::AwaitingReady => {
                player.state = ScheduledState::Paused;
                return;
            }
            _ => return,
        }

        self.emit(VisibilityEvent::Paused {
            player_id: id.to_string(),
        });
    }

    fn evict(&mut self, id: &PlayerId) {
        let Some(player) = self.players.get_mut(id) else {
            return;
        };
        if let Some(token) = player.retry.take() {
            self.timers.cancel(token);
        }
        if player.state.is_terminal() {
            return;
        }

        release_handle(id, player.handle.as_ref());
        player.state = ScheduledState::Disposed;
        player.on_screen = false;
        player.yielded = false;
        let audible = player.audible;

        if audible {
            if let Some(coordinator) = &self.coordinator {
                coordinator.unregister_player(id.as_str());
            }
        }
        debug!(player_id = %id, "Disposed player outside retain window");
        self.emit(VisibilityEvent::Disposed {
            player_id: id.to_string(),
        });
    }

    /// Final cleanup for a player that is no longer managed.
    fn teardown(&mut self, id: &PlayerId, player: ManagedPlayer) {
        if let Some(token) = player.retry {
            self.timers.cancel(token);
        }
        if let Some(coordinator) = &self.coordinator {
            if player.audible {
                coordinator.unregister_player(id.as_str());
            }
        }
        if !player.state.is_terminal() {
            release_handle(id, player.handle.as_ref());
            self.emit(VisibilityEvent::Disposed {
                player_id: id.to_string(),
            });
        }
    }

    fn set_state(&mut self, id: &PlayerId, state: ScheduledState) {
        if let Some(player) = self.players.get_mut(id) {
            player.state = state;
        }
    }

    fn ids_by_index(&self) -> Vec<PlayerId> {
        let mut ids: Vec<(usize, &PlayerId)> = self
            .players
            .iter()
            .map(|(id, player)| (player.index, id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id.clone()).collect()
    }

    fn now(&self) -> u64 {
        self.clock.monotonic_millis()
    }

    fn emit(&self, event: VisibilityEvent) {
        if let Some(events) = &self.events {
            let _ = events.emit(MediaEvent::Visibility(event));
        }
    }
}

impl Drop for VisibilityScheduler {
    fn drop(&mut self) {
        if !self.players.is_empty() {
            self.shutdown();
        }
    }
}

impl fmt::Debug for VisibilityScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityScheduler")
            .field("managed", &self.players.len())
            .field("focused", &self.focused)
            .field("visible", &self.visible)
            .field("pending_timers", &self.timers.len())
            .finish()
    }
}

/// Polls `scheduler` until no deadline remains, sleeping between deadlines.
///
/// Requires a clock that advances on its own, such as `SystemClock`.
pub async fn run_until_idle(scheduler: &mut VisibilityScheduler) {
    loop {
        scheduler.poll();
        let Some(deadline) = scheduler.next_deadline() else {
            break;
        };
        let wait = deadline.saturating_sub(scheduler.now());
        core_async::sleep(Duration::from_millis(wait)).await;
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn pause_handle(id: &PlayerId, handle: &dyn PlayerHandle) {
    if let Err(err) = handle.pause() {
        debug!(player_id = %id, error = %err, "pause() failed");
    }
}

/// Pause then dispose. Errors are logged; the handle is considered gone.
fn release_handle(id: &PlayerId, handle: &dyn PlayerHandle) {
    pause_handle(id, handle);
    if let Err(err) = handle.dispose() {
        warn!(player_id = %id, error = %err, "dispose() failed");
    }
}
