#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod gateway;
pub mod services;
pub mod session;
pub mod words;

// Re-exports for public API
pub use config::BotConfig;
pub use error::AppError;
pub use errors::DomainError;
pub use session::GameSession;
pub use words::WordBook;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    bot_test_support::logging::init();
}
