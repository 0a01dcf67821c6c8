//! Game flow orchestration service - drives one session from start to
//! finish over the messaging gateway.
//!
//! The service owns no session state; it mutates the session's locked
//! state in short critical sections and performs all chat I/O between
//! them, so at most one reply is ever awaited at a time.

use parking_lot::Mutex;
use rand::prelude::*;
use tracing::{info, warn};

use crate::domain::state::{GameStatus, Identity};
use crate::domain::voting::{self, Ballot, BallotError};
use crate::domain::{assign, win};
use crate::error::AppError;
use crate::gateway::Messenger;
use crate::session::GameSession;

/// Runs the speak/vote round protocol for one session at a time.
pub struct GameFlowService {
    /// Thread-safe RNG; trait methods take `&self` but drawing needs
    /// mutable access.
    rng: Mutex<StdRng>,
    tie_break_cap: Option<u32>,
}

impl GameFlowService {
    /// Create a new flow service.
    ///
    /// * `seed` - `Some(seed)` for reproducible randomness in tests,
    ///   `None` for system entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
            tie_break_cap: None,
        }
    }

    /// Bound the number of tie-break iterations per round. Off by default;
    /// the unbounded loop is the protocol's own behavior.
    pub fn with_tie_break_cap(mut self, cap: Option<u32>) -> Self {
        self.tie_break_cap = cap;
        self
    }

    /// Drive a session whose start has been claimed through rounds until a
    /// winner exists. Returns the winning identity.
    pub async fn run(
        &self,
        session: &GameSession,
        channel: &dyn Messenger,
    ) -> Result<Identity, AppError> {
        self.start(session, channel).await?;

        let winner = loop {
            if let Some(winner) = session.with_state(|state| win::evaluate(state)) {
                break winner;
            }
            let round = session.with_state(|state| {
                state.round += 1;
                state.round
            });
            channel.send_public(&format!("Round {round}.")).await?;
            self.run_round(session, channel).await?;
        };

        self.finish(session, channel, winner).await?;
        Ok(winner)
    }

    /// Complete the `preparing -> started` transition: assign identities
    /// and keywords, shuffle the seating order, reveal privately, announce
    /// publicly.
    async fn start(
        &self,
        session: &GameSession,
        channel: &dyn Messenger,
    ) -> Result<(), AppError> {
        let (reveals, roster, spy_count, civilian_count) =
            session.with_state(|state| {
                let mut rng = self.rng.lock();
                assign::assign_identities(state, session.words(), &mut *rng)?;
                state.active.shuffle(&mut *rng);

                let reveals: Vec<_> = state
                    .active_players()
                    .filter_map(|player| {
                        let assignment = player.assignment.as_ref()?;
                        Some((
                            player.user.clone(),
                            format!(
                                "Your word: {}. Your number: #{}.",
                                assignment.keyword, player.id
                            ),
                        ))
                    })
                    .collect();
                let roster = state
                    .active_players()
                    .map(|player| player.to_string())
                    .collect::<Vec<_>>()
                    .join("\n");
                let spy_count = state.spies.len();
                let civilian_count = state.active_count() - spy_count;
                Ok::<_, AppError>((reveals, roster, spy_count, civilian_count))
            })?;

        for (user, text) in &reveals {
            channel.send_private(user, text).await?;
        }
        channel
            .send_public(&format!("Players:\n{roster}\nRemember your numbers."))
            .await?;
        channel
            .send_public(&format!(
                "Identities have been handed out: {spy_count} spies and {civilian_count} civilians are among you."
            ))
            .await?;
        channel
            .send_public(
                "Civilians win by voting out every spy; spies win by staying in. The game starts now.",
            )
            .await?;

        info!(
            game = session.name(),
            players = reveals.len(),
            spies = spy_count,
            "session started"
        );
        Ok(())
    }

    /// Run one elimination round against the current active roster and
    /// return the arena index of the eliminated player.
    ///
    /// Tied top-voted players describe again and the whole roster votes
    /// again, until a single player holds the most votes. Without a
    /// configured cap this loop is unbounded.
    pub async fn run_round(
        &self,
        session: &GameSession,
        channel: &dyn Messenger,
    ) -> Result<usize, AppError> {
        let mut candidates: Vec<usize> = session.with_state(|state| state.active.clone());
        let mut tie_iterations = 0u32;

        while candidates.len() > 1 {
            {
                let mut rng = self.rng.lock();
                candidates.shuffle(&mut *rng);
            }

            // Speak phase: the reply's arrival ends the turn, its content
            // does not matter to the protocol.
            for &idx in &candidates {
                let (user, label) = session.with_state(|state| {
                    let player = &state.players[idx];
                    (player.user.clone(), player.to_string())
                });
                channel
                    .send_public(&format!("{label}, please describe your word."))
                    .await?;
                let _ = channel.await_reply(&user).await?;
            }

            // Vote phase: the whole active roster votes, in reverse seating
            // order, so whoever speaks early in a round votes late.
            let voters: Vec<usize> =
                session.with_state(|state| state.active.iter().rev().copied().collect());
            for idx in voters {
                let (user, label) = session.with_state(|state| {
                    let player = &state.players[idx];
                    (player.user.clone(), player.to_string())
                });
                channel
                    .send_public(&format!(
                        "{label}, vote for the player you suspect: send their number, or 0 to abstain."
                    ))
                    .await?;

                loop {
                    let reply = channel.await_reply(&user).await?;
                    match voting::parse_ballot(&reply) {
                        Err(BallotError::NotANumber) => {
                            channel
                                .send_public("That was not a number, please vote again.")
                                .await?;
                        }
                        Ok(Ballot::Abstain) => break,
                        Ok(Ballot::For(ordinal)) => {
                            let recorded = session.with_state(|state| {
                                match state.find_active_by_ordinal(ordinal) {
                                    Some(target) => {
                                        state.players[target].vote_count += 1;
                                        true
                                    }
                                    None => false,
                                }
                            });
                            if recorded {
                                break;
                            }
                            channel
                                .send_public("No player has that number, please vote again.")
                                .await?;
                        }
                    }
                }
            }

            let (top, tie_message) = session.with_state(|state| {
                let top = voting::top_voted(state);
                let message = (top.len() > 1).then(|| {
                    let names = top
                        .iter()
                        .map(|&idx| state.players[idx].to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!(
                        "Tie between {names}. Tied players describe again, everyone votes again."
                    )
                });
                voting::reset_votes(state);
                (top, message)
            });
            candidates = top;

            if let Some(message) = tie_message {
                channel.send_public(&message).await?;
                tie_iterations += 1;
                if let Some(cap) = self.tie_break_cap {
                    if tie_iterations >= cap {
                        // Operational escape hatch, deviates from the
                        // protocol: resolve the tie by lot.
                        let picked = {
                            let mut rng = self.rng.lock();
                            candidates[rng.random_range(0..candidates.len())]
                        };
                        warn!(
                            game = session.name(),
                            tie_iterations, "tie-break cap reached, drawing lots"
                        );
                        channel
                            .send_public("The vote will not settle; drawing lots to decide.")
                            .await?;
                        candidates = vec![picked];
                    }
                }
            }
        }

        let target = candidates[0];
        let (label, remaining) = session.with_state(|state| {
            state.eliminate(target);
            (state.players[target].to_string(), state.active_count())
        });
        channel
            .send_public(&format!("{label} has been voted out."))
            .await?;
        info!(game = session.name(), remaining, "player eliminated");
        Ok(target)
    }

    /// Complete the `started -> finished` transition and publish the
    /// end-of-game report.
    async fn finish(
        &self,
        session: &GameSession,
        channel: &dyn Messenger,
        winner: Identity,
    ) -> Result<(), AppError> {
        let text = session.with_state(|state| {
            state.status = GameStatus::Finished;
            let spies = state
                .spies
                .iter()
                .map(|&idx| state.players[idx].to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let side = match winner {
                Identity::Spy => "the spies win",
                Identity::Civilian => "the civilians win",
            };
            match &state.words {
                Some(pair) => format!(
                    "Game over, {side}. Spies: {spies}. Spy word: {}, civilian word: {}.",
                    pair.spy, pair.civilian
                ),
                None => format!("Game over, {side}."),
            }
        });
        channel.send_public(&text).await?;
        info!(game = session.name(), winner = ?winner, "session finished");
        Ok(())
    }
}
