//! Messaging gateway abstractions.
//!
//! The game core talks to chat through two seams: [`ChatGateway`] is the
//! low-level client surface (rooms, history polling, group management) and
//! [`Messenger`] is the narrow per-session contract the round loop uses.
//! Both are trait objects so the test suites can script them in memory.

pub mod channel;
pub mod rocket;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AppError;

pub use channel::GroupChannel;
pub use rocket::RocketClient;

/// A chat account as the gateway reports it. The `id` is opaque and stable;
/// the username is what humans see and what direct-message rooms are keyed
/// by.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

/// Room flavors with distinct history endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomKind {
    /// Public channel (the command surface).
    Channel,
    /// Private group (one per game).
    Group,
    /// Direct-message room.
    Direct,
}

/// One buffered message from a room, oldest-first delivery.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub user: ChatUser,
    pub text: String,
}

/// Low-level chat client operations.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send_message(&self, room_id: &str, text: &str) -> Result<(), AppError>;

    /// Pop the next unread message of a room, if any. Messages sent by the
    /// bot account itself are never delivered. A popped message is consumed
    /// whether or not the caller cares about its sender.
    async fn next_message(
        &self,
        room_id: &str,
        kind: RoomKind,
    ) -> Result<Option<IncomingMessage>, AppError>;

    /// Resolve (and create if needed) the direct-message room with a user.
    async fn direct_room(&self, username: &str) -> Result<String, AppError>;

    /// Create a private group with one initial member, returning its room id.
    async fn create_group(&self, name: &str, member: &str) -> Result<String, AppError>;

    async fn invite_to_group(&self, room_id: &str, user_id: &str) -> Result<(), AppError>;

    async fn kick_from_group(&self, room_id: &str, user_id: &str) -> Result<(), AppError>;

    async fn delete_group(&self, room_id: &str) -> Result<(), AppError>;
}

/// The session-facing messaging contract.
///
/// `await_reply` blocks until a message from exactly the given user shows up
/// in the session's room. Messages other participants send while a specific
/// reply is awaited are consumed and dropped, so the protocol depends on
/// players answering in the order they are prompted.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_private(&self, user: &ChatUser, text: &str) -> Result<(), AppError>;

    async fn send_public(&self, text: &str) -> Result<(), AppError>;

    async fn await_reply(&self, user: &ChatUser) -> Result<String, AppError>;
}
