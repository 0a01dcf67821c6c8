//! One game session: identity, word-book handle, and lock-guarded state.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::rules::MIN_PLAYERS;
use crate::domain::state::{GameStatus, SessionState};
use crate::errors::domain::{ConflictKind, DomainError};
use crate::gateway::ChatUser;
use crate::words::WordBook;

/// Shared handle to a running or preparing game.
///
/// The registry and the session's worker task both hold this through an
/// `Arc`; every state access goes through the internal mutex. The worker
/// never holds the lock across an await, so registry commands (status
/// queries, joins) stay responsive while the game waits on a player.
pub struct GameSession {
    id: u64,
    name: String,
    creator: ChatUser,
    group_id: String,
    words: Arc<WordBook>,
    state: Mutex<SessionState>,
}

impl GameSession {
    pub fn new(
        id: u64,
        name: String,
        creator: ChatUser,
        group_id: String,
        words: Arc<WordBook>,
    ) -> Self {
        let state = Mutex::new(SessionState::new(creator.clone()));
        Self {
            id,
            name,
            creator,
            group_id,
            words,
            state,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn creator(&self) -> &ChatUser {
        &self.creator
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn words(&self) -> &WordBook {
        &self.words
    }

    pub fn status(&self) -> GameStatus {
        self.state.lock().status
    }

    pub fn is_creator(&self, user_id: &str) -> bool {
        self.creator.id == user_id
    }

    pub fn has_active_user(&self, user_id: &str) -> bool {
        self.state.lock().has_active_user(user_id)
    }

    pub fn player_count(&self) -> usize {
        self.state.lock().active_count()
    }

    /// Add a participant; rejected once the roster has closed.
    pub fn add_player(&self, user: ChatUser) -> Result<usize, DomainError> {
        let mut state = self.state.lock();
        state.add_player(user)?;
        Ok(state.active_count())
    }

    /// Remove a participant from a still-preparing roster.
    pub fn remove_preparing_player(&self, user_id: &str) -> Result<(), DomainError> {
        self.state.lock().remove_preparing_player(user_id)
    }

    /// Claim the `preparing -> started` transition.
    ///
    /// Atomic gate for the start command: exactly one caller can move the
    /// session out of `Preparing`, and only with a big-enough roster. A
    /// second start attempt fails here without touching roster or round
    /// state.
    pub fn claim_start(&self) -> Result<(), DomainError> {
        let mut state = self.state.lock();
        if state.status != GameStatus::Preparing {
            return Err(DomainError::conflict(
                ConflictKind::WrongStatus,
                "The game has already started or finished.",
            ));
        }
        if state.active_count() < MIN_PLAYERS {
            return Err(DomainError::configuration(format!(
                "At least {MIN_PLAYERS} players are needed to start."
            )));
        }
        state.status = GameStatus::Started;
        Ok(())
    }

    /// Run a closure against the locked state. Callers must not await
    /// while inside.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.state.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: &str) -> ChatUser {
        ChatUser {
            id: format!("id-{n}"),
            username: n.to_string(),
        }
    }

    fn session_of(names: &[&str]) -> GameSession {
        let words = Arc::new(WordBook::from_groups(vec![vec![
            "coffee".into(),
            "tea".into(),
        ]]));
        let session = GameSession::new(1, "game1".into(), user(names[0]), "g-1".into(), words);
        for name in &names[1..] {
            session.add_player(user(name)).unwrap();
        }
        session
    }

    #[test]
    fn start_requires_the_minimum_roster() {
        let session = session_of(&["a", "b"]);
        assert!(session.claim_start().is_err());
        assert_eq!(session.status(), GameStatus::Preparing);
    }

    #[test]
    fn start_can_only_be_claimed_once() {
        let session = session_of(&["a", "b", "c"]);
        session.claim_start().unwrap();
        assert_eq!(session.status(), GameStatus::Started);

        let err = session.claim_start().unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict(ConflictKind::WrongStatus, _)
        ));
        // Roster and round state are untouched by the rejected claim.
        assert_eq!(session.player_count(), 3);
        assert_eq!(session.with_state(|s| s.round), 0);
    }

    #[test]
    fn joins_are_rejected_after_start() {
        let session = session_of(&["a", "b", "c"]);
        session.claim_start().unwrap();
        assert!(session.add_player(user("d")).is_err());
        assert_eq!(session.player_count(), 3);
    }
}
