use thiserror::Error;

use crate::errors::domain::DomainError;

/// Application-level error type.
///
/// Everything above the pure domain layer returns `Result<T, AppError>`.
/// Domain failures are converted through the `From<DomainError>` impl so a
/// service can use `?` on both domain calls and gateway calls.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Gateway error: {detail}")]
    Gateway { detail: String },
    #[error("Word list error: {detail}")]
    Words { detail: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn gateway(detail: impl Into<String>) -> Self {
        Self::Gateway {
            detail: detail.into(),
        }
    }

    pub fn words(detail: impl Into<String>) -> Self {
        Self::Words {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    /// Text suitable for posting back to the channel a command came from.
    ///
    /// Domain rejections carry a player-appropriate detail string; anything
    /// operational is collapsed to a generic apology so internals never leak
    /// into the chat.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Domain(err) => err.detail().to_string(),
            _ => "Something went wrong, please try again later.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::domain::{ConflictKind, DomainError};

    #[test]
    fn domain_errors_surface_their_detail_to_users() {
        let err: AppError =
            DomainError::conflict(ConflictKind::NameTaken, "That game name is already taken.")
                .into();
        assert_eq!(err.user_message(), "That game name is already taken.");
    }

    #[test]
    fn operational_errors_are_not_shown_verbatim() {
        let err = AppError::gateway("connection reset by peer");
        assert!(!err.user_message().contains("connection reset"));
    }
}
