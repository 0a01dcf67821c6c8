//! Win evaluation, consulted after every elimination.

use crate::domain::state::{Identity, SessionState};

/// Evaluate the current active roster. `None` means play continues.
pub fn evaluate(state: &SessionState) -> Option<Identity> {
    let (spies, civilians) = state.composition();
    evaluate_counts(state.starting_count, spies, civilians)
}

/// Pure form of the evaluator.
///
/// Three-player games are a special case and must not be folded into the
/// general inequality: after the single elimination such a game supports,
/// a surviving spy has won (the civilians voted one of their own out), and
/// the general formula would instead end the game before any round runs.
pub fn evaluate_counts(
    starting_count: usize,
    spies: usize,
    civilians: usize,
) -> Option<Identity> {
    if spies == 0 {
        return Some(Identity::Civilian);
    }
    if starting_count == 3 {
        if spies == 1 && civilians == 1 {
            Some(Identity::Spy)
        } else {
            None
        }
    } else if spies + 1 >= civilians {
        Some(Identity::Spy)
    } else {
        None
    }
}
