//! Error handling for the bot.

pub mod domain;

pub use domain::DomainError;
