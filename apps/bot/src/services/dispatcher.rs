//! Command dispatcher: polls the public channel and routes slash commands.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::commands::{self, Command};
use crate::error::AppError;
use crate::gateway::{ChatGateway, IncomingMessage, RoomKind};
use crate::services::registry::GameRegistry;

/// Reads the command channel and answers in it. Runs on the main task;
/// session workers never block it.
pub struct Dispatcher {
    registry: Arc<GameRegistry>,
    gateway: Arc<dyn ChatGateway>,
    channel_id: String,
    poll_interval: Duration,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<GameRegistry>,
        gateway: Arc<dyn ChatGateway>,
        channel_id: String,
        poll_interval: Duration,
    ) -> Self {
        Self {
            registry,
            gateway,
            channel_id,
            poll_interval,
        }
    }

    /// Poll loop; only returns on a persistent setup problem, transient
    /// gateway errors are logged and retried.
    pub async fn run(&self) -> Result<(), AppError> {
        info!(channel = %self.channel_id, "command dispatcher running");
        loop {
            match self
                .gateway
                .next_message(&self.channel_id, RoomKind::Channel)
                .await
            {
                Ok(Some(message)) => self.handle(&message).await,
                Ok(None) => tokio::time::sleep(self.poll_interval).await,
                Err(err) => {
                    error!(error = %err, "polling the command channel failed");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Handle one channel message. Non-commands are ignored; every
    /// command gets a public answer.
    pub async fn handle(&self, message: &IncomingMessage) {
        let Some(command) = commands::parse(&message.text) else {
            return;
        };
        debug!(from = %message.user.username, command = ?command, "handling command");

        let outcome = match &command {
            Command::Create(name) => self.registry.create_game(&message.user, name).await,
            Command::Join(name) => self.registry.join_game(&message.user, name).await,
            Command::Start(name) => self.registry.start_game(&message.user, name),
            Command::Cancel(name) => self.registry.cancel_game(&message.user, name).await,
            Command::Quit => self.registry.quit_game(&message.user).await,
            Command::List => Ok(self.registry.list_games()),
        };

        let reply = match outcome {
            Ok(text) => text,
            Err(err) => {
                if !matches!(err, AppError::Domain(_)) {
                    error!(error = %err, command = ?command, "command failed");
                }
                err.user_message()
            }
        };
        if let Err(err) = self.gateway.send_message(&self.channel_id, &reply).await {
            error!(error = %err, "failed to answer in the command channel");
        }
    }
}
