//! Persisted login state.
//!
//! The session survives restarts: every change is written to durable
//! storage and read back once at startup via `SessionStore::initialize_store`.

mod state;
mod store;

pub use state::{Session, UserProfile};
pub use store::SessionStore;
