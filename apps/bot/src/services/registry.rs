//! Session registry: name -> session map and the command policies.
//!
//! The map is guarded by a mutex because session worker tasks finish
//! concurrently with commands touching the same sessions. Policy checks
//! that span several sessions (one-unfinished-game-per-player) are atomic
//! with respect to workers because workers never mutate the map, only
//! their own session's state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{error, info};

use crate::commands;
use crate::domain::GameStatus;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::gateway::{ChatGateway, ChatUser, GroupChannel};
use crate::session::GameSession;
use crate::services::game_flow::GameFlowService;
use crate::words::WordBook;

#[derive(Default)]
struct RegistryInner {
    games: HashMap<String, Arc<GameSession>>,
    next_game_id: u64,
}

/// All live sessions, plus what a new session needs to run.
pub struct GameRegistry {
    gateway: Arc<dyn ChatGateway>,
    words: Arc<WordBook>,
    main_channel_id: String,
    poll_interval: Duration,
    tie_break_cap: Option<u32>,
    inner: Mutex<RegistryInner>,
}

impl GameRegistry {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        words: Arc<WordBook>,
        main_channel_id: String,
        poll_interval: Duration,
        tie_break_cap: Option<u32>,
    ) -> Self {
        Self {
            gateway,
            words,
            main_channel_id,
            poll_interval,
            tie_break_cap,
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Create a game and its private group; the creator is the first
    /// participant.
    pub async fn create_game(&self, user: &ChatUser, name: &str) -> Result<String, AppError> {
        if !commands::valid_game_name(name) {
            return Err(DomainError::validation(
                "Game names are 1-9 letters or digits.",
            )
            .into());
        }
        let id = {
            let mut inner = self.inner.lock();
            if inner.games.contains_key(name) {
                return Err(DomainError::conflict(
                    ConflictKind::NameTaken,
                    "That game name is already taken.",
                )
                .into());
            }
            if Self::user_in_unfinished(&inner, &user.id) {
                return Err(DomainError::conflict(
                    ConflictKind::AlreadyJoined,
                    "You are already in a game.",
                )
                .into());
            }
            inner.next_game_id += 1;
            inner.next_game_id
        };

        let group_id = self.gateway.create_group(name, &user.username).await?;
        let session = Arc::new(GameSession::new(
            id,
            name.to_string(),
            user.clone(),
            group_id,
            self.words.clone(),
        ));
        self.inner.lock().games.insert(name.to_string(), session);

        info!(game = name, creator = %user.username, "game created");
        Ok(format!(
            "Game '{name}' created; a private group has been opened for it. Join with /join {name}."
        ))
    }

    /// Join a still-preparing game.
    pub async fn join_game(&self, user: &ChatUser, name: &str) -> Result<String, AppError> {
        let session = self.find(name)?;
        if Self::user_in_unfinished(&self.inner.lock(), &user.id) {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyJoined,
                "You are already in a game.",
            )
            .into());
        }
        let player_count = session.add_player(user.clone())?;
        self.gateway
            .invite_to_group(session.group_id(), &user.id)
            .await?;

        info!(game = name, player = %user.username, player_count, "player joined");
        Ok(format!(
            "{} joined '{name}' ({player_count} players).",
            user.username
        ))
    }

    /// Cancel a game that is not running; creator only. The private group
    /// is dismissed.
    pub async fn cancel_game(&self, user: &ChatUser, name: &str) -> Result<String, AppError> {
        let session = self.find(name)?;
        if !session.is_creator(&user.id) {
            return Err(DomainError::conflict(
                ConflictKind::NotCreator,
                "Only the creator can cancel a game.",
            )
            .into());
        }
        if session.status() == GameStatus::Started {
            return Err(DomainError::conflict(
                ConflictKind::WrongStatus,
                "A running game cannot be cancelled.",
            )
            .into());
        }
        self.gateway.delete_group(session.group_id()).await?;
        self.inner.lock().games.remove(name);

        info!(game = name, "game cancelled");
        Ok(format!("Game '{name}' has been cancelled."))
    }

    /// Leave the preparing game the user is part of. Creators cannot
    /// leave their own game.
    pub async fn quit_game(&self, user: &ChatUser) -> Result<String, AppError> {
        let found = {
            let inner = self.inner.lock();
            inner
                .games
                .iter()
                .find(|(_, session)| {
                    session.status() == GameStatus::Preparing
                        && session.has_active_user(&user.id)
                })
                .map(|(name, session)| (name.clone(), session.clone()))
        };
        let (name, session) = found.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Player,
                "You are not in any game that is still preparing.",
            )
        })?;
        if session.is_creator(&user.id) {
            return Err(DomainError::conflict(
                ConflictKind::NotCreator,
                "The creator cannot leave their own game; cancel it instead.",
            )
            .into());
        }
        session.remove_preparing_player(&user.id)?;
        self.gateway
            .kick_from_group(session.group_id(), &user.id)
            .await?;

        info!(game = %name, player = %user.username, "player left");
        Ok(format!("{} left game '{name}'.", user.username))
    }

    /// Start a game: claim the transition, then hand the session to its
    /// own worker task. The claim is the idempotence gate; a second start
    /// lands here and is rejected.
    pub fn start_game(&self, user: &ChatUser, name: &str) -> Result<String, AppError> {
        let session = self.find(name)?;
        if !session.is_creator(&user.id) {
            return Err(DomainError::conflict(
                ConflictKind::NotCreator,
                "Only the creator can start the game.",
            )
            .into());
        }
        session.claim_start()?;

        let flow = GameFlowService::new(None).with_tie_break_cap(self.tie_break_cap);
        let channel = GroupChannel::new(
            self.gateway.clone(),
            session.group_id().to_string(),
            self.poll_interval,
        );
        let gateway = self.gateway.clone();
        let main_channel_id = self.main_channel_id.clone();
        let worker_session = session.clone();
        tokio::spawn(async move {
            match flow.run(worker_session.as_ref(), &channel).await {
                Ok(winner) => {
                    info!(game = worker_session.name(), winner = ?winner, "game finished");
                    let notice = format!("Game '{}' has finished.", worker_session.name());
                    if let Err(err) = gateway.send_message(&main_channel_id, &notice).await {
                        error!(error = %err, "failed to announce the finished game");
                    }
                }
                Err(err) => {
                    error!(game = worker_session.name(), error = %err, "game aborted");
                }
            }
        });

        info!(game = name, "game starting");
        Ok(format!("Game '{name}' is starting, watch its group."))
    }

    /// One line per live game.
    pub fn list_games(&self) -> String {
        let inner = self.inner.lock();
        if inner.games.is_empty() {
            return "No games yet. Create one with /newgame <name>.".to_string();
        }
        let mut lines: Vec<String> = inner
            .games
            .iter()
            .map(|(name, session)| {
                format!(
                    "{name} - created by {} - {}",
                    session.creator().username,
                    session.status()
                )
            })
            .collect();
        lines.sort();
        lines.join("\n")
    }

    /// Look up a session by name.
    pub fn find(&self, name: &str) -> Result<Arc<GameSession>, AppError> {
        self.inner
            .lock()
            .games
            .get(name)
            .cloned()
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Game, "No game with that name.").into()
            })
    }

    fn user_in_unfinished(inner: &RegistryInner, user_id: &str) -> bool {
        inner.games.values().any(|session| {
            session.status() != GameStatus::Finished
                && session.has_active_user(user_id)
        })
    }
}
