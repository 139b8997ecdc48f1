//! Player registry.
//!
//! Plain bookkeeping with no locking and no callbacks. The coordinator owns
//! one behind a mutex and decides when stop callbacks run; keeping the map
//! free of side effects lets every mutation finish before any user code does.

use crate::types::PlayerId;
use bridge_traits::{PlayerKind, Stoppable};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One registered player.
#[derive(Clone)]
pub struct PlayerEntry {
    pub id: PlayerId,
    pub kind: PlayerKind,
    pub stop: Arc<dyn Stoppable>,
}

impl PlayerEntry {
    pub fn new(id: PlayerId, kind: PlayerKind, stop: Arc<dyn Stoppable>) -> Self {
        Self { id, kind, stop }
    }
}

impl fmt::Debug for PlayerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerEntry")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Entry removed from the registry together with whether it owned audio.
#[derive(Debug)]
pub struct Removed {
    pub entry: PlayerEntry,
    pub was_active: bool,
}

/// Live players keyed by id, plus the current audio owner.
///
/// `active` always names a registered id or is `None`.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    entries: HashMap<PlayerId, PlayerEntry>,
    active: Option<PlayerId>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry`, replacing any live entry with the same id.
    ///
    /// A replaced entry loses audio ownership; the fresh mount has to request
    /// it again.
    pub fn insert(&mut self, entry: PlayerEntry) -> Option<Removed> {
        let id = entry.id.clone();
        let displaced = self.entries.insert(id.clone(), entry)?;
        let was_active = self.active.as_ref() == Some(&id);
        if was_active {
            self.active = None;
        }
        Some(Removed {
            entry: displaced,
            was_active,
        })
    }

    pub fn remove(&mut self, id: &str) -> Option<Removed> {
        let entry = self.entries.remove(id)?;
        let was_active = self.active.as_ref().map(PlayerId::as_str) == Some(id);
        if was_active {
            self.active = None;
        }
        Some(Removed { entry, was_active })
    }

    pub fn get(&self, id: &str) -> Option<&PlayerEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn active(&self) -> Option<&PlayerId> {
        self.active.as_ref()
    }

    /// Makes `id` the audio owner. Returns `false` if it is not registered.
    pub fn set_active(&mut self, id: &str) -> bool {
        match self.entries.get(id) {
            Some(entry) => {
                self.active = Some(entry.id.clone());
                true
            }
            None => false,
        }
    }

    /// Clears ownership and returns the entry that held it.
    pub fn take_active(&mut self) -> Option<PlayerEntry> {
        let id = self.active.take()?;
        self.entries.get(&id).cloned()
    }

    /// Removes every entry and clears ownership.
    ///
    /// Entries come back in id order so sweeps are reproducible.
    pub fn drain(&mut self) -> (Vec<PlayerEntry>, Option<PlayerId>) {
        let active = self.active.take();
        let mut entries: Vec<PlayerEntry> =
            self.entries.drain().map(|(_, entry)| entry).collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        (entries, active)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }
}
