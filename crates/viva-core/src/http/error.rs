use thiserror::Error;

use crate::storage::StorageError;

/// `detail` the backend sends when a bearer token fails verification.
pub const CREDENTIALS_INVALID_DETAIL: &str = "Could not validate credentials";

#[derive(Error, Debug)]
pub enum ApiError {
    /// Reading the token (or persisting one) failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("request failed"))]
    Status {
        status: u16,
        /// `detail` string from a JSON error body, if present.
        detail: Option<String>,
        body: String,
    },

    /// A 2xx body that did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("failed to encode upload: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Build a status error, pulling `detail` out of a JSON body.
    pub fn from_status(status: u16, body: String) -> Self {
        let detail = extract_detail(&body);
        ApiError::Status {
            status,
            detail,
            body,
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error means the session's credentials are no longer valid.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ApiError::Status { status, detail, .. } => {
                is_auth_failure(*status, detail.as_deref())
            }
            _ => false,
        }
    }
}

/// A 401, or any status carrying the credential-invalid detail.
pub fn is_auth_failure(status: u16, detail: Option<&str>) -> bool {
    status == 401 || detail == Some(CREDENTIALS_INVALID_DETAIL)
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_is_auth_failure() {
        assert!(is_auth_failure(401, None));
        assert!(is_auth_failure(401, Some("anything")));
    }

    #[test]
    fn credential_detail_is_auth_failure_at_any_status() {
        assert!(is_auth_failure(403, Some(CREDENTIALS_INVALID_DETAIL)));
        assert!(is_auth_failure(500, Some(CREDENTIALS_INVALID_DETAIL)));
    }

    #[test]
    fn other_errors_are_not_auth_failures() {
        assert!(!is_auth_failure(403, None));
        assert!(!is_auth_failure(500, Some("Error retrieving user essays")));
        assert!(!is_auth_failure(400, Some("could not validate credentials")));
    }

    #[test]
    fn from_status_extracts_detail() {
        let err = ApiError::from_status(
            401,
            r#"{"detail":"Could not validate credentials"}"#.to_string(),
        );
        match &err {
            ApiError::Status { status, detail, .. } => {
                assert_eq!(*status, 401);
                assert_eq!(detail.as_deref(), Some(CREDENTIALS_INVALID_DETAIL));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_auth_failure());
        assert_eq!(err.to_string(), "HTTP 401: Could not validate credentials");
    }

    #[test]
    fn from_status_tolerates_non_json_and_non_string_detail() {
        let plain = ApiError::from_status(502, "Bad Gateway".to_string());
        assert!(matches!(plain, ApiError::Status { detail: None, .. }));
        assert_eq!(plain.to_string(), "HTTP 502: request failed");

        let listy = ApiError::from_status(422, r#"{"detail":[{"msg":"field required"}]}"#.to_string());
        assert!(matches!(listy, ApiError::Status { detail: None, .. }));
    }

    #[test]
    fn transport_errors_are_not_auth_failures() {
        let err = ApiError::Transport("connection refused".to_string());
        assert!(!err.is_auth_failure());
        assert_eq!(err.status(), None);
    }
}
