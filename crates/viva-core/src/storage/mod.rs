//! Durable client-side key/value storage.
//!
//! # Overview
//!
//! The session and the HTTP client both read and write a small set of string
//! keys that must survive process restarts:
//!
//! - **`jwt_token`** - bearer credential attached to outbound requests
//! - **`user`** - JSON serialization of the signed-in user's profile
//! - **`isLoggedIn`** - `"true"` / `"false"`
//!
//! Storage is modelled as a trait so the file-backed store used by the CLI
//! and the in-memory store used by tests are interchangeable.
//!
//! # File Layout
//!
//! ```text
//! ~/.viva/                 (or VIVA_DATA_DIR)
//! └── storage.json         # { "jwt_token": "...", "user": "{...}", "isLoggedIn": "true" }
//! ```

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "jwt_token";

/// Key holding the serialized user profile.
pub const USER_KEY: &str = "user";

/// Key holding the login flag as `"true"` / `"false"`.
pub const LOGGED_IN_KEY: &str = "isLoggedIn";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key/value storage that outlives the process.
///
/// Every mutation is written through before returning. There is no
/// transaction spanning several keys.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
