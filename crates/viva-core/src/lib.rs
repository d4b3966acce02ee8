//! # viva-core
//!
//! Client library for the viva study service: essays segmented into
//! sentences, learner expressions mapped onto them, and spaced-repetition
//! word review.
//!
//! ## Key Concepts
//!
//! - **Storage**: durable string keys (`jwt_token`, `user`, `isLoggedIn`)
//! - **Session**: who is signed in, mirrored into storage
//! - **HttpClient**: attaches the bearer token and recovers from expired
//!   sessions on every call
//! - **VivaApi**: one method per backend endpoint
//! - **VivaContext**: all of the above wired together

pub mod api;
pub mod config;
pub mod context;
pub mod http;
pub mod identity;
pub mod models;
pub mod notifications;
pub mod paths;
pub mod session;
pub mod storage;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use api::{ImageUpload, VivaApi};
pub use config::{ClientConfig, ConfigError};
pub use context::{ContextError, VivaContext};
pub use http::{ApiError, ApiResponse, HttpClient};
pub use identity::IdentityPrompt;
pub use notifications::{Notification, NotificationBus, Severity};
pub use session::{Session, SessionStore, UserProfile};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
