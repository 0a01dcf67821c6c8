//! Identity and keyword assignment at game start.

use rand::seq::index;
use rand::Rng;

use crate::domain::rules::{spy_count_bounds, MIN_PLAYERS};
use crate::domain::state::{Assignment, Identity, PlayerId, SessionState, WordPair};
use crate::errors::domain::DomainError;
use crate::words::{self, WordBook};

/// Assign identities, keywords, and in-session ordinals to the roster.
///
/// The spy count is drawn uniformly from `1..=N / SPIES_PER_PLAYER`, the spy
/// subset is sampled without replacement, and the keyword pair comes from a
/// uniformly chosen word group (first draw = spy word). Ordinals follow the
/// current roster order, so players keep the numbers they joined with.
///
/// Fails without touching the state when the roster is below the minimum or
/// the word book cannot produce a pair.
pub fn assign_identities(
    state: &mut SessionState,
    book: &WordBook,
    rng: &mut impl Rng,
) -> Result<(), DomainError> {
    let n = state.active_count();
    let bounds = spy_count_bounds(n).ok_or_else(|| {
        DomainError::configuration(format!(
            "At least {MIN_PLAYERS} players are needed, this game has {n}."
        ))
    })?;

    let group = book
        .sample(rng)
        .ok_or_else(|| DomainError::configuration("The word list is empty."))?;
    let (spy_word, civilian_word) = words::draw_two_distinct(group, rng)?;

    let spy_count = rng.random_range(bounds);
    let spy_seats = index::sample(rng, n, spy_count).into_vec();

    let order = state.active.clone();
    for (seat, &arena_idx) in order.iter().enumerate() {
        let identity = if spy_seats.contains(&seat) {
            Identity::Spy
        } else {
            Identity::Civilian
        };
        let keyword = match identity {
            Identity::Spy => spy_word.clone(),
            Identity::Civilian => civilian_word.clone(),
        };
        let player = &mut state.players[arena_idx];
        player.id = (seat + 1) as PlayerId;
        player.assignment = Some(Assignment { identity, keyword });
    }

    state.spies = spy_seats.iter().map(|&seat| order[seat]).collect();
    state.words = Some(WordPair {
        spy: spy_word,
        civilian: civilian_word,
    });
    state.starting_count = n;
    Ok(())
}
