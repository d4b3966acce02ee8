//! Session snapshot types.

use serde::{Deserialize, Serialize};

/// Opaque user profile as returned by the backend.
///
/// Stored and forwarded without interpretation.
pub type UserProfile = serde_json::Value;

/// Point-in-time view of the client's authentication state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token currently held in durable storage.
    pub token: Option<String>,

    /// Profile of the signed-in user, if any.
    pub user: Option<UserProfile>,

    /// Whether the client believes a user is signed in.
    ///
    /// Token freshness is never checked here; expiry is only noticed when a
    /// request fails.
    pub is_logged_in: bool,
}
