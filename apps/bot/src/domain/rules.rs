//! Fixed rule constants and the spy-count bound.

use std::ops::RangeInclusive;

/// A session cannot start with fewer participants than this.
pub const MIN_PLAYERS: usize = 3;

/// One spy is allowed per this many players; the spy count is drawn from
/// `1..=player_count / SPIES_PER_PLAYER`.
pub const SPIES_PER_PLAYER: usize = 3;

/// Upper bound on the spy count for a roster of the given size.
pub fn max_spies(player_count: usize) -> usize {
    player_count / SPIES_PER_PLAYER
}

/// Inclusive range the spy count is drawn from, or `None` when the roster
/// is too small to start at all.
pub fn spy_count_bounds(player_count: usize) -> Option<RangeInclusive<usize>> {
    if player_count < MIN_PLAYERS {
        return None;
    }
    Some(1..=max_spies(player_count))
}
