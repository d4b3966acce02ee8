//! HttpClient - the single choke point for backend calls.
//!
//! # Interception
//!
//! Every request passes through two phases:
//!
//! 1. **Request**: the bearer token is read from durable storage (never from
//!    the in-memory session) and attached as `Authorization: Bearer <token>`.
//!    A storage read failure aborts the call with `ApiError::Storage`.
//! 2. **Response**: a non-2xx answer becomes `ApiError::Status`. If it is an
//!    authentication failure (401, or the backend's credential-invalid
//!    `detail` at any status) the client runs recovery and then returns the
//!    original error unchanged.
//!
//! # Recovery
//!
//! Recovery clears the token, logs the session out, asks the identity
//! provider to prompt again (when one is configured) and publishes an error
//! notification. It runs once per failing call and never retries the request.
//! Concurrent recoveries converge on the same logged-out state.

use std::io::Read;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::request::{OutboundRequest, RequestBody};
use crate::config::ClientConfig;
use crate::identity::IdentityPrompt;
use crate::notifications::{Notification, NotificationBus};
use crate::session::SessionStore;
use crate::storage::{KeyValueStore, TOKEN_KEY};

/// Message shown to the user when the session has expired.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please sign in again.";

const JSON_CONTENT_TYPE: &str = "application/json";

/// A decoded 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: T,
}

pub struct HttpClient {
    agent: ureq::Agent,
    base_url: String,
    storage: Arc<dyn KeyValueStore>,
    session: Arc<SessionStore>,
    notifications: Arc<NotificationBus>,
    identity_prompt: Option<Arc<dyn IdentityPrompt>>,
}

impl HttpClient {
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        session: Arc<SessionStore>,
        notifications: Arc<NotificationBus>,
    ) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            storage,
            session,
            notifications,
            identity_prompt: None,
        }
    }

    /// Configure the identity provider hook used during recovery.
    pub fn with_identity_prompt(mut self, prompt: Arc<dyn IdentityPrompt>) -> Self {
        self.identity_prompt = Some(prompt);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request through both interception phases and decode the body.
    pub fn send<T: DeserializeOwned>(
        &self,
        request: OutboundRequest,
    ) -> Result<ApiResponse<T>, ApiError> {
        let request = self.authorize(request)?;
        let url = self.url(&request.path);
        log::debug!("{} {}", request.method, url);

        let result = self.dispatch(request, &url);

        if let Err(err) = &result {
            if err.is_auth_failure() {
                log::warn!("Authentication failed for {url}: {err}");
                self.recover();
            } else {
                log::debug!("Request to {url} failed: {err}");
            }
        }

        result
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.send(OutboundRequest::get(path))
    }

    pub fn post_json<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: serde::Serialize,
    {
        self.send(OutboundRequest::post(path).json(body)?)
    }

    pub fn put_json<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: serde::Serialize,
    {
        self.send(OutboundRequest::put(path).json(body)?)
    }

    fn current_token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// Request phase: attach the stored bearer token, if any.
    fn authorize(&self, request: OutboundRequest) -> Result<OutboundRequest, ApiError> {
        Ok(match self.current_token()? {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn dispatch<T: DeserializeOwned>(
        &self,
        request: OutboundRequest,
        url: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        let mut req = self
            .agent
            .request(request.method.as_str(), url)
            .set("Accept", JSON_CONTENT_TYPE);

        for (key, value) in &request.query {
            req = req.query(key, value);
        }

        let (content_type, payload) = match request.body {
            RequestBody::Empty => (JSON_CONTENT_TYPE.to_string(), None),
            RequestBody::Json(value) => {
                let bytes =
                    serde_json::to_vec(&value).map_err(|e| ApiError::Decode(e.to_string()))?;
                (JSON_CONTENT_TYPE.to_string(), Some(bytes))
            }
            RequestBody::Multipart(form) => {
                let (content_type, bytes) = form.encode()?;
                (content_type, Some(bytes))
            }
        };
        req = req.set("Content-Type", &content_type);

        for (name, value) in &request.headers {
            req = req.set(name, value);
        }

        let result = match payload {
            Some(bytes) => req.send_bytes(&bytes),
            None => req.call(),
        };

        match result {
            Ok(response) => {
                let status = response.status();
                let mut body = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut body)
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                let data = decode_body(&body)?;
                Ok(ApiResponse { status, data })
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(ApiError::from_status(status, body))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(ApiError::Transport(transport.to_string()))
            }
        }
    }

    /// Clear credentials and tell the user their session expired.
    ///
    /// Each step is best effort; failures are logged and the remaining steps
    /// still run.
    pub(crate) fn recover(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            log::warn!("Failed to remove stored token: {}", e);
        }
        if let Err(e) = self.session.logout() {
            log::warn!("Failed to clear session: {}", e);
        }
        if let Some(prompt) = &self.identity_prompt {
            prompt.prompt();
        }
        self.notifications
            .notify(Notification::error(SESSION_EXPIRED_MESSAGE));
    }
}

/// Successful bodies are read in full through `into_reader`, which unlike
/// `into_string` has no size cap.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let result = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(body)
    };
    result.map_err(|e| ApiError::Decode(e.to_string()))
}
