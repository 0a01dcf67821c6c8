//! Rocket.Chat REST implementation of [`ChatGateway`].
//!
//! Message delivery is pull-based: each room has a cursor holding the
//! messages fetched-but-not-delivered and the id of the last delivered one.
//! History is only read back to the moment the process signed in, so chat
//! that predates the bot never looks like input.

use std::collections::VecDeque;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::AppError;
use crate::gateway::{ChatGateway, ChatUser, IncomingMessage, RoomKind};

/// REST client for one signed-in bot account.
pub struct RocketClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: String,
    user_id: String,
    username: String,
    /// RFC 3339 sign-in instant, passed as the `oldest` history bound.
    started_at: String,
    cursors: DashMap<String, RoomCursor>,
    /// username -> direct-message room id.
    direct_rooms: DashMap<String, String>,
}

#[derive(Default)]
struct RoomCursor {
    /// Newest-first, as the history endpoint returns them; delivery pops
    /// from the back so players are served oldest-first.
    pending: VecDeque<RawMessage>,
    last_delivered: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMessage {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "msg")]
    text: String,
    #[serde(rename = "u")]
    user: ChatUser,
}

#[derive(Deserialize)]
struct LoginResponse {
    data: LoginData,
}

#[derive(Deserialize)]
struct LoginData {
    #[serde(rename = "authToken")]
    auth_token: String,
    #[serde(rename = "userId")]
    user_id: String,
}

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    messages: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RoomIdHolder {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Deserialize)]
struct ImCreateResponse {
    room: RoomIdHolder,
}

#[derive(Deserialize)]
struct GroupCreateResponse {
    group: RoomIdHolder,
}

impl RocketClient {
    /// Sign in and capture the auth headers every later call needs.
    pub async fn login(
        base_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::new();
        let started_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|err| AppError::internal(format!("timestamp formatting: {err}")))?;

        let response = http
            .post(format!("{base_url}/api/v1/login"))
            .json(&json!({ "user": username, "password": password }))
            .send()
            .await
            .map_err(|err| AppError::gateway(format!("login: {err}")))?
            .error_for_status()
            .map_err(|err| AppError::gateway(format!("login: {err}")))?;

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|err| AppError::gateway(format!("login response: {err}")))?;

        Ok(Self {
            http,
            base_url,
            auth_token: login.data.auth_token,
            user_id: login.data.user_id,
            username: username.to_string(),
            started_at,
            cursors: DashMap::new(),
            direct_rooms: DashMap::new(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/v1/{endpoint}", self.base_url)
    }

    async fn post(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, AppError> {
        self.http
            .post(self.url(endpoint))
            .header("X-Auth-Token", &self.auth_token)
            .header("X-User-Id", &self.user_id)
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::gateway(format!("POST {endpoint}: {err}")))?
            .error_for_status()
            .map_err(|err| AppError::gateway(format!("POST {endpoint}: {err}")))
    }

    /// Fetch a room's history since sign-in, newest-first, with the bot's
    /// own messages and non-text entries (joins, topic changes) dropped.
    async fn fetch_history(
        &self,
        room_id: &str,
        kind: RoomKind,
    ) -> Result<Vec<RawMessage>, AppError> {
        let endpoint = match kind {
            RoomKind::Channel => "channels.history",
            RoomKind::Group => "groups.history",
            RoomKind::Direct => "im.history",
        };
        let response = self
            .http
            .get(self.url(endpoint))
            .header("X-Auth-Token", &self.auth_token)
            .header("X-User-Id", &self.user_id)
            .query(&[
                ("roomId", room_id),
                ("oldest", self.started_at.as_str()),
                ("count", "100"),
            ])
            .send()
            .await
            .map_err(|err| AppError::gateway(format!("GET {endpoint}: {err}")))?
            .error_for_status()
            .map_err(|err| AppError::gateway(format!("GET {endpoint}: {err}")))?;

        let history: HistoryResponse = response
            .json()
            .await
            .map_err(|err| AppError::gateway(format!("{endpoint} response: {err}")))?;

        Ok(history
            .messages
            .into_iter()
            .filter_map(|value| serde_json::from_value::<RawMessage>(value).ok())
            .filter(|message| message.user.username != self.username)
            .collect())
    }
}

#[async_trait]
impl ChatGateway for RocketClient {
    async fn send_message(&self, room_id: &str, text: &str) -> Result<(), AppError> {
        self.post("chat.postMessage", json!({ "roomId": room_id, "text": text }))
            .await?;
        Ok(())
    }

    async fn next_message(
        &self,
        room_id: &str,
        kind: RoomKind,
    ) -> Result<Option<IncomingMessage>, AppError> {
        let needs_refill = self
            .cursors
            .get(room_id)
            .map_or(true, |cursor| cursor.pending.is_empty());

        if needs_refill {
            let fetched = self.fetch_history(room_id, kind).await?;
            let mut cursor = self.cursors.entry(room_id.to_string()).or_default();
            // Keep only what arrived after the last delivered message. If
            // that message scrolled out of the fetched window, everything
            // in the window counts as new.
            let boundary = match &cursor.last_delivered {
                Some(last) => fetched
                    .iter()
                    .position(|message| &message.id == last)
                    .unwrap_or(fetched.len()),
                None => fetched.len(),
            };
            cursor.pending = fetched.into_iter().take(boundary).collect();
        }

        let mut cursor = self.cursors.entry(room_id.to_string()).or_default();
        match cursor.pending.pop_back() {
            Some(message) => {
                cursor.last_delivered = Some(message.id.clone());
                debug!(room_id, from = %message.user.username, "delivering buffered message");
                Ok(Some(IncomingMessage {
                    user: message.user,
                    text: message.text,
                }))
            }
            None => Ok(None),
        }
    }

    async fn direct_room(&self, username: &str) -> Result<String, AppError> {
        if let Some(room) = self.direct_rooms.get(username) {
            return Ok(room.clone());
        }
        let response = self
            .post("im.create", json!({ "username": username }))
            .await?;
        let created: ImCreateResponse = response
            .json()
            .await
            .map_err(|err| AppError::gateway(format!("im.create response: {err}")))?;
        self.direct_rooms
            .insert(username.to_string(), created.room.id.clone());
        Ok(created.room.id)
    }

    async fn create_group(&self, name: &str, member: &str) -> Result<String, AppError> {
        let response = self
            .post("groups.create", json!({ "name": name, "members": [member] }))
            .await?;
        let created: GroupCreateResponse = response
            .json()
            .await
            .map_err(|err| AppError::gateway(format!("groups.create response: {err}")))?;
        Ok(created.group.id)
    }

    async fn invite_to_group(&self, room_id: &str, user_id: &str) -> Result<(), AppError> {
        self.post("groups.invite", json!({ "roomId": room_id, "userId": user_id }))
            .await?;
        Ok(())
    }

    async fn kick_from_group(&self, room_id: &str, user_id: &str) -> Result<(), AppError> {
        self.post("groups.kick", json!({ "roomId": room_id, "userId": user_id }))
            .await?;
        Ok(())
    }

    async fn delete_group(&self, room_id: &str) -> Result<(), AppError> {
        self.post("groups.delete", json!({ "roomId": room_id }))
            .await?;
        Ok(())
    }
}
