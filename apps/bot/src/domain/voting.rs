//! Ballot parsing and vote tallying.

use crate::domain::state::SessionState;

/// A single voter's submitted choice. `For` carries the raw ordinal as
/// typed; whether it names an active player is checked against the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ballot {
    Abstain,
    For(i64),
}

/// Recoverable ballot rejection; the voter is re-prompted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotError {
    NotANumber,
}

/// Parse one chat reply as a ballot. The literal token `"0"` abstains;
/// anything else must parse as an integer.
pub fn parse_ballot(text: &str) -> Result<Ballot, BallotError> {
    let trimmed = text.trim();
    if trimmed == "0" {
        return Ok(Ballot::Abstain);
    }
    trimmed
        .parse::<i64>()
        .map(Ballot::For)
        .map_err(|_| BallotError::NotANumber)
}

/// Highest vote count among active players.
pub fn max_votes(state: &SessionState) -> u32 {
    state
        .active_players()
        .map(|p| p.vote_count)
        .max()
        .unwrap_or(0)
}

/// Arena indices of the active players holding the highest vote count, in
/// seating order. More than one entry means a tie.
pub fn top_voted(state: &SessionState) -> Vec<usize> {
    let max = max_votes(state);
    state
        .active
        .iter()
        .copied()
        .filter(|&idx| state.players[idx].vote_count == max)
        .collect()
}

/// Zero every active player's vote count for the next sub-round.
pub fn reset_votes(state: &mut SessionState) {
    for &idx in &state.active.clone() {
        state.players[idx].vote_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ChatUser;

    #[test]
    fn zero_is_an_abstention() {
        assert_eq!(parse_ballot("0"), Ok(Ballot::Abstain));
        assert_eq!(parse_ballot("  0  "), Ok(Ballot::Abstain));
    }

    #[test]
    fn integers_become_candidate_ballots() {
        assert_eq!(parse_ballot("3"), Ok(Ballot::For(3)));
        assert_eq!(parse_ballot("-1"), Ok(Ballot::For(-1)));
        assert_eq!(parse_ballot("99"), Ok(Ballot::For(99)));
    }

    #[test]
    fn anything_else_is_rejected() {
        assert_eq!(parse_ballot("abc"), Err(BallotError::NotANumber));
        assert_eq!(parse_ballot(""), Err(BallotError::NotANumber));
        assert_eq!(parse_ballot("two"), Err(BallotError::NotANumber));
    }

    fn state_with_votes(votes: &[u32]) -> SessionState {
        let mut state = SessionState::new(ChatUser {
            id: "id-0".into(),
            username: "p0".into(),
        });
        for i in 1..votes.len() {
            state
                .add_player(ChatUser {
                    id: format!("id-{i}"),
                    username: format!("p{i}"),
                })
                .unwrap();
        }
        for (i, &v) in votes.iter().enumerate() {
            state.players[i].vote_count = v;
        }
        state
    }

    #[test]
    fn top_voted_finds_the_single_leader() {
        let state = state_with_votes(&[3, 1, 0, 0]);
        assert_eq!(top_voted(&state), vec![0]);
    }

    #[test]
    fn top_voted_reports_ties_in_seating_order() {
        let state = state_with_votes(&[2, 0, 2, 0]);
        assert_eq!(top_voted(&state), vec![0, 2]);
    }

    #[test]
    fn reset_clears_every_active_count() {
        let mut state = state_with_votes(&[2, 1, 2]);
        reset_votes(&mut state);
        assert!(state.active_players().all(|p| p.vote_count == 0));
    }
}
