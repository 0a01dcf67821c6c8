//! Runtime configuration from environment variables.
//!
//! Environment variables must be set by the runtime environment (container
//! env file, or sourced manually for local development). Credentials have
//! no defaults on purpose.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Everything the process needs to sign in and run.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Rocket.Chat server base URL.
    pub server_url: String,
    /// Bot account credentials.
    pub username: String,
    pub password: String,
    /// Public channel carrying the command surface.
    pub channel_id: String,
    /// Grouped keyword file.
    pub words_path: PathBuf,
    /// Delay between reply polls.
    pub poll_interval: Duration,
    /// Optional bound on tie-break iterations per round; unbounded when
    /// unset, which is the protocol's own behavior.
    pub tie_break_cap: Option<u32>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            server_url: must_var("BOT_SERVER_URL")?,
            username: must_var("BOT_USERNAME")?,
            password: must_var("BOT_PASSWORD")?,
            channel_id: must_var("BOT_CHANNEL_ID")?,
            words_path: env::var("BOT_WORDS_PATH")
                .unwrap_or_else(|_| "words.csv".to_string())
                .into(),
            poll_interval: Duration::from_millis(parsed_var("BOT_POLL_INTERVAL_MS", 1000)?),
            tie_break_cap: optional_parsed_var("BOT_TIE_BREAK_CAP")?,
        })
    }
}

fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::config(format!("{name} must be set")))
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{name} must be a number, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}

fn optional_parsed_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::config(format!("{name} must be a number, got '{raw}'"))),
        Err(_) => Ok(None),
    }
}
