//! Shared fixtures for the integration suites: scripted messengers, a
//! recording gateway, and pre-started sessions with known identities.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use bot::domain::state::{Assignment, Identity, WordPair};
use bot::domain::PlayerId;
use bot::error::AppError;
use bot::gateway::{ChatGateway, ChatUser, IncomingMessage, Messenger, RoomKind};
use bot::session::GameSession;
use bot::words::WordBook;
use bot_test_support::unique_helpers::{unique_str, unique_username};

pub fn init_logging() {
    bot_test_support::logging::init();
}

/// Deterministic user for fixtures that reference ids in assertions.
pub fn user(name: &str) -> ChatUser {
    ChatUser {
        id: format!("id-{name}"),
        username: name.to_string(),
    }
}

/// Collision-free user for suites that run against a shared registry.
pub fn unique_user(prefix: &str) -> ChatUser {
    ChatUser {
        id: unique_str("id"),
        username: unique_username(prefix),
    }
}

pub fn test_book() -> Arc<WordBook> {
    Arc::new(WordBook::from_groups(vec![
        vec!["submarine".into(), "ship".into(), "ferry".into()],
        vec!["piano".into(), "violin".into()],
    ]))
}

/// Build a session that has already passed its start transition, with
/// seating equal to join order, ordinals 1..=N, and the given seats as
/// spies. Bypasses the random assigner so votes in the scripts can name
/// players by number.
pub fn started_session(names: &[&str], spy_seats: &[usize]) -> GameSession {
    let session = GameSession::new(
        1,
        "testgame".to_string(),
        user(names[0]),
        "group-1".to_string(),
        test_book(),
    );
    for name in &names[1..] {
        session.add_player(user(name)).unwrap();
    }
    session.claim_start().unwrap();

    session.with_state(|state| {
        let order = state.active.clone();
        for (seat, &arena_idx) in order.iter().enumerate() {
            let identity = if spy_seats.contains(&seat) {
                Identity::Spy
            } else {
                Identity::Civilian
            };
            let keyword = match identity {
                Identity::Spy => "submarine",
                Identity::Civilian => "ship",
            };
            let player = &mut state.players[arena_idx];
            player.id = (seat + 1) as PlayerId;
            player.assignment = Some(Assignment {
                identity,
                keyword: keyword.to_string(),
            });
        }
        state.spies = spy_seats.iter().map(|&seat| order[seat]).collect();
        state.words = Some(WordPair {
            spy: "submarine".to_string(),
            civilian: "ship".to_string(),
        });
        state.starting_count = order.len();
    });
    session
}

/// [`Messenger`] with one scripted reply queue per user. Running out of
/// replies fails the awaiting test instead of blocking it.
#[derive(Default)]
pub struct ScriptedMessenger {
    replies: Mutex<HashMap<String, VecDeque<String>>>,
    public: Mutex<Vec<String>>,
    private: Mutex<Vec<(String, String)>>,
}

impl ScriptedMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, user: &ChatUser, replies: &[&str]) {
        self.replies
            .lock()
            .entry(user.id.clone())
            .or_default()
            .extend(replies.iter().map(|reply| reply.to_string()));
    }

    pub fn public_log(&self) -> Vec<String> {
        self.public.lock().clone()
    }

    pub fn private_log(&self) -> Vec<(String, String)> {
        self.private.lock().clone()
    }

    pub fn count_public_containing(&self, needle: &str) -> usize {
        self.public
            .lock()
            .iter()
            .filter(|text| text.contains(needle))
            .count()
    }
}

#[async_trait]
impl Messenger for ScriptedMessenger {
    async fn send_private(&self, user: &ChatUser, text: &str) -> Result<(), AppError> {
        self.private
            .lock()
            .push((user.username.clone(), text.to_string()));
        Ok(())
    }

    async fn send_public(&self, text: &str) -> Result<(), AppError> {
        self.public.lock().push(text.to_string());
        Ok(())
    }

    async fn await_reply(&self, user: &ChatUser) -> Result<String, AppError> {
        self.replies
            .lock()
            .get_mut(&user.id)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| {
                AppError::internal(format!("no scripted reply left for {}", user.username))
            })
    }
}

/// [`ChatGateway`] that records every call and never delivers messages.
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<(String, String)>>,
    pub invited: Mutex<Vec<(String, String)>>,
    pub kicked: Mutex<Vec<(String, String)>>,
    pub deleted: Mutex<Vec<String>>,
    pub created_groups: Mutex<Vec<String>>,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent_to(&self, room_id: &str) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|(room, _)| room == room_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl ChatGateway for RecordingGateway {
    async fn send_message(&self, room_id: &str, text: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .push((room_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn next_message(
        &self,
        _room_id: &str,
        _kind: RoomKind,
    ) -> Result<Option<IncomingMessage>, AppError> {
        Ok(None)
    }

    async fn direct_room(&self, username: &str) -> Result<String, AppError> {
        Ok(format!("dm-{username}"))
    }

    async fn create_group(&self, name: &str, _member: &str) -> Result<String, AppError> {
        let mut created = self.created_groups.lock();
        created.push(name.to_string());
        Ok(format!("group-{}", created.len()))
    }

    async fn invite_to_group(&self, room_id: &str, user_id: &str) -> Result<(), AppError> {
        self.invited
            .lock()
            .push((room_id.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn kick_from_group(&self, room_id: &str, user_id: &str) -> Result<(), AppError> {
        self.kicked
            .lock()
            .push((room_id.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn delete_group(&self, room_id: &str) -> Result<(), AppError> {
        self.deleted.lock().push(room_id.to_string());
        Ok(())
    }
}
