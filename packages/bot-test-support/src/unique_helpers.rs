//! Test helpers for generating unique test data
//!
//! Chat user ids and usernames must not collide between concurrently running
//! test suites, so they are derived from ULIDs.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use bot_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("user");
/// let id2 = unique_str("user");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("user-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique chat username with the given prefix.
///
/// Usernames are lowercase because the gateway resolves direct-message rooms
/// by username and Rocket.Chat usernames are case-folded.
pub fn unique_username(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new()).to_lowercase()
}
