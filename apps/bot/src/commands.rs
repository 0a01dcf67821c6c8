//! Slash-command parsing for the public channel.

use lazy_regex::{regex_captures, regex_is_match};

/// Parsed command surface. Anything else in the channel is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(String),
    Join(String),
    Start(String),
    Cancel(String),
    Quit,
    List,
}

/// Parse a channel message. Returns `None` for ordinary chatter.
pub fn parse(text: &str) -> Option<Command> {
    let text = text.trim();
    if let Some((_, name)) = regex_captures!(r"^/newgame\s+(\S+)$", text) {
        return Some(Command::Create(name.to_string()));
    }
    if let Some((_, name)) = regex_captures!(r"^/join\s+(\S+)$", text) {
        return Some(Command::Join(name.to_string()));
    }
    if let Some((_, name)) = regex_captures!(r"^/start\s+(\S+)$", text) {
        return Some(Command::Start(name.to_string()));
    }
    if let Some((_, name)) = regex_captures!(r"^/cancel\s+(\S+)$", text) {
        return Some(Command::Cancel(name.to_string()));
    }
    if regex_is_match!(r"^/quit$", text) {
        return Some(Command::Quit);
    }
    if regex_is_match!(r"^/games$", text) {
        return Some(Command::List);
    }
    None
}

/// Game names double as private-group names, so they stay short and plain.
pub fn valid_game_name(name: &str) -> bool {
    regex_is_match!(r"^[A-Za-z0-9]{1,9}$", name)
}
