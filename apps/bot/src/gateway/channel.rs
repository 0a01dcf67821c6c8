//! Per-session messenger bound to one private group.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;
use crate::gateway::{ChatGateway, ChatUser, Messenger, RoomKind};

/// [`Messenger`] implementation that broadcasts into a game's private group
/// and polls that same group for replies.
pub struct GroupChannel {
    gateway: Arc<dyn ChatGateway>,
    group_id: String,
    poll_interval: Duration,
}

impl GroupChannel {
    pub fn new(gateway: Arc<dyn ChatGateway>, group_id: String, poll_interval: Duration) -> Self {
        Self {
            gateway,
            group_id,
            poll_interval,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }
}

#[async_trait]
impl Messenger for GroupChannel {
    async fn send_private(&self, user: &ChatUser, text: &str) -> Result<(), AppError> {
        let room = self.gateway.direct_room(&user.username).await?;
        self.gateway.send_message(&room, text).await
    }

    async fn send_public(&self, text: &str) -> Result<(), AppError> {
        self.gateway.send_message(&self.group_id, text).await
    }

    /// Poll the group until the target user speaks. Unbounded: an absent
    /// player stalls their session's task, nothing else.
    async fn await_reply(&self, user: &ChatUser) -> Result<String, AppError> {
        loop {
            if let Some(message) = self
                .gateway
                .next_message(&self.group_id, RoomKind::Group)
                .await?
            {
                if message.user.id == user.id {
                    return Ok(message.text);
                }
                // Someone spoke out of turn; their message is gone.
                continue;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
