//! VivaContext - the wired-up client that front ends hold on to.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────────────┐
//!                 │       VivaContext        │
//!                 ├──────────────────────────┤
//!                 │  - KeyValueStore         │
//!                 │  - SessionStore          │
//!                 │  - NotificationBus       │
//!                 │  - HttpClient            │
//!                 │  - VivaApi               │
//!                 └────────────┬─────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//!        ┌───────────┐                   ┌───────────┐
//!        │  viva CLI │                   │   tests   │
//!        └───────────┘                   └───────────┘
//! ```
//!
//! All parts share the same storage handle, so a recovery triggered by the
//! HTTP client is immediately visible through the session store.

use std::sync::Arc;

use thiserror::Error;

use crate::api::VivaApi;
use crate::config::{ClientConfig, ConfigError};
use crate::http::{ApiError, HttpClient};
use crate::identity::IdentityPrompt;
use crate::models::LoginPayload;
use crate::notifications::NotificationBus;
use crate::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore, StorageError, TOKEN_KEY};

#[derive(Error, Debug)]
pub enum ContextError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration for building a VivaContext.
#[derive(Default)]
pub struct VivaContextBuilder {
    config: Option<ClientConfig>,
    storage: Option<Arc<dyn KeyValueStore>>,
    notifications: Option<Arc<NotificationBus>>,
    identity_prompt: Option<Arc<dyn IdentityPrompt>>,
}

impl VivaContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit configuration instead of [`ClientConfig::from_env`].
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing store instead of opening `storage.json` in the data dir.
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn notifications(mut self, bus: Arc<NotificationBus>) -> Self {
        self.notifications = Some(bus);
        self
    }

    pub fn identity_prompt(mut self, prompt: Arc<dyn IdentityPrompt>) -> Self {
        self.identity_prompt = Some(prompt);
        self
    }

    /// Build the context and rehydrate the session from storage.
    pub fn build(self) -> Result<VivaContext, ContextError> {
        let config = match self.config {
            Some(config) => config,
            None => ClientConfig::from_env()?,
        };

        let storage: Arc<dyn KeyValueStore> = match self.storage {
            Some(storage) => storage,
            None => Arc::new(FileStore::open(&config.data_dir)?),
        };

        let session = Arc::new(SessionStore::new(Arc::clone(&storage)));
        session.initialize_store()?;

        let notifications = self
            .notifications
            .unwrap_or_else(|| Arc::new(NotificationBus::new()));

        let mut client = HttpClient::new(
            &config,
            Arc::clone(&storage),
            Arc::clone(&session),
            Arc::clone(&notifications),
        );
        if let Some(prompt) = self.identity_prompt {
            client = client.with_identity_prompt(prompt);
        }
        let client = Arc::new(client);
        let api = Arc::new(VivaApi::new(Arc::clone(&client), Arc::clone(&storage)));

        log::debug!("Context ready for {}", config.base_url);

        Ok(VivaContext {
            config,
            storage,
            session,
            notifications,
            client,
            api,
        })
    }
}

/// Shared client state. Cloning only clones the `Arc`s.
#[derive(Clone)]
pub struct VivaContext {
    pub config: ClientConfig,
    pub storage: Arc<dyn KeyValueStore>,
    pub session: Arc<SessionStore>,
    pub notifications: Arc<NotificationBus>,
    pub client: Arc<HttpClient>,
    pub api: Arc<VivaApi>,
}

impl VivaContext {
    pub fn builder() -> VivaContextBuilder {
        VivaContextBuilder::new()
    }

    /// Verify a Google ID token and record the returned user as signed in.
    pub fn login_with_google(&self, id_token: &str) -> Result<LoginPayload, ApiError> {
        let payload = self.api.verify_google_token(id_token)?;
        if let Some(user) = payload.user.clone() {
            self.session.set_user(user)?;
        }
        self.session.set_logged_in(true)?;
        log::info!("Signed in");
        Ok(payload)
    }

    /// Forget the token and the signed-in user.
    pub fn sign_out(&self) -> Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY)?;
        self.session.logout()
    }
}
