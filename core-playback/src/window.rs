//! Preload and retain windows around the visible players.

use crate::config::PlaybackConfig;

/// What the scheduler should do with a player given its list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// In the settled visible set; eligible to play.
    Visible,
    /// Within `preload_radius` of a visible player; mounted and paused.
    Preload,
    /// Within `retain_radius`; kept paused.
    Retain,
    /// Beyond the retain window; paused and disposed.
    Evict,
}

impl Placement {
    pub fn keeps_decoder(&self) -> bool {
        !matches!(self, Placement::Evict)
    }
}

/// Distance from `index` to the closest entry of `visible` (sorted ascending).
pub fn nearest_distance(index: usize, visible: &[usize]) -> Option<usize> {
    let split = visible.partition_point(|&v| v < index);
    let after = visible.get(split).map(|&v| v - index);
    let before = split
        .checked_sub(1)
        .and_then(|i| visible.get(i))
        .map(|&v| index - v);

    match (before, after) {
        (Some(b), Some(a)) => Some(b.min(a)),
        (b, a) => b.or(a),
    }
}

/// Placement of a player that is not itself visible.
///
/// With nothing visible there is no window to measure against, so every
/// player is kept. Anything outside the retain window of the last visible set
/// was already evicted when that set settled.
pub fn place(index: usize, visible: &[usize], config: &PlaybackConfig) -> Placement {
    match nearest_distance(index, visible) {
        None => Placement::Retain,
        Some(distance) if distance <= config.preload_radius => Placement::Preload,
        Some(distance) if distance <= config.retain_radius => Placement::Retain,
        Some(_) => Placement::Evict,
    }
}
