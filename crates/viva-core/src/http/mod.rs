//! Authenticated HTTP access to the viva backend.

mod client;
mod error;
mod multipart;
mod request;

pub use client::{ApiResponse, HttpClient, SESSION_EXPIRED_MESSAGE};
pub use error::{is_auth_failure, ApiError, CREDENTIALS_INVALID_DETAIL};
pub use multipart::MultipartForm;
pub use request::{Method, OutboundRequest, RequestBody};
