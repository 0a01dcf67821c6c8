//! Session state container: player arena plus the active seating order.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::gateway::ChatUser;

/// In-session ordinal, assigned 1..=N when the game starts. 0 = unassigned.
pub type PlayerId = u8;

/// The two identities. Spies form the minority holding the odd keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Spy,
    Civilian,
}

/// Overall session lifecycle. Transitions are one-way:
/// `Preparing -> Started -> Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Roster open, accepting joins.
    Preparing,
    /// Round loop running.
    Started,
    /// Terminal; a winner exists.
    Finished,
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let label = match self {
            GameStatus::Preparing => "preparing",
            GameStatus::Started => "started",
            GameStatus::Finished => "finished",
        };
        write!(f, "{label}")
    }
}

/// The keyword pair drawn for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    pub spy: String,
    pub civilian: String,
}

/// Identity and keyword handed to a player when the game starts.
/// Immutable for the player's lifetime in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub identity: Identity,
    pub keyword: String,
}

/// One participant record in the arena.
#[derive(Debug, Clone)]
pub struct Player {
    pub user: ChatUser,
    pub id: PlayerId,
    pub assignment: Option<Assignment>,
    /// Votes received in the current voting sub-round.
    pub vote_count: u32,
}

impl Player {
    pub fn new(user: ChatUser) -> Self {
        Self {
            user,
            id: 0,
            assignment: None,
            vote_count: 0,
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.assignment.as_ref().map(|a| a.identity)
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.id > 0 {
            write!(f, "{} (#{})", self.user.username, self.id)
        } else {
            write!(f, "{}", self.user.username)
        }
    }
}

/// Mutable state of one session.
///
/// `players` is an arena: once the game has started, records are never
/// removed from it. Elimination only removes an index from `active`, so the
/// eliminated player stays available for the end-of-game report. `active`
/// doubles as the seating order.
#[derive(Debug)]
pub struct SessionState {
    pub players: Vec<Player>,
    pub active: Vec<usize>,
    pub status: GameStatus,
    pub round: u32,
    pub words: Option<WordPair>,
    /// Arena indices of the spy subset, fixed at start.
    pub spies: Vec<usize>,
    /// Roster size when the game started; the win evaluator branches on it.
    pub starting_count: usize,
}

impl SessionState {
    pub fn new(creator: ChatUser) -> Self {
        Self {
            players: vec![Player::new(creator)],
            active: vec![0],
            status: GameStatus::Preparing,
            round: 0,
            words: None,
            spies: Vec::new(),
            starting_count: 0,
        }
    }

    /// Add a participant to the open roster.
    pub fn add_player(&mut self, user: ChatUser) -> Result<(), DomainError> {
        if self.status != GameStatus::Preparing {
            return Err(DomainError::conflict(
                ConflictKind::WrongStatus,
                "The game has already started or finished.",
            ));
        }
        self.players.push(Player::new(user));
        self.active.push(self.players.len() - 1);
        Ok(())
    }

    /// Remove a participant from a still-open roster. While preparing, the
    /// arena guarantee does not apply yet, so the record goes away entirely.
    pub fn remove_preparing_player(&mut self, user_id: &str) -> Result<(), DomainError> {
        if self.status != GameStatus::Preparing {
            return Err(DomainError::conflict(
                ConflictKind::WrongStatus,
                "The game has already started or finished.",
            ));
        }
        let pos = self
            .players
            .iter()
            .position(|p| p.user.id == user_id)
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Player, "You are not in this game.")
            })?;
        self.players.remove(pos);
        self.active = (0..self.players.len()).collect();
        Ok(())
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Active players in seating order.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.active.iter().map(|&idx| &self.players[idx])
    }

    pub fn has_active_user(&self, user_id: &str) -> bool {
        self.active_players().any(|p| p.user.id == user_id)
    }

    /// Look up the arena index of an active player by in-session ordinal.
    /// The ordinal comes from chat input, hence the wide integer type.
    pub fn find_active_by_ordinal(&self, ordinal: i64) -> Option<usize> {
        self.active
            .iter()
            .copied()
            .find(|&idx| i64::from(self.players[idx].id) == ordinal)
    }

    /// Remove a player from the active seating order. The arena record is
    /// kept; elimination is irreversible.
    pub fn eliminate(&mut self, arena_idx: usize) {
        self.active.retain(|&idx| idx != arena_idx);
    }

    /// Number of (spies, civilians) still in the active roster.
    pub fn composition(&self) -> (usize, usize) {
        let mut spies = 0;
        let mut civilians = 0;
        for player in self.active_players() {
            match player.identity() {
                Some(Identity::Spy) => spies += 1,
                Some(Identity::Civilian) => civilians += 1,
                None => {}
            }
        }
        (spies, civilians)
    }
}
