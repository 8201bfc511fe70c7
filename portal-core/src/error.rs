use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Authentication expired. Please login again.")]
    AuthExpired,

    #[error("HTTP error! status: {status}")]
    Http { status: u16, body: Option<Value> },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("{0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Rejected(String),

    #[error("You don't have permission to {0}")]
    PermissionDenied(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl PortalError {
    /// Text suitable for a user-facing notification.
    ///
    /// HTTP failures prefer the backend's `error` field when the body has one.
    pub fn user_message(&self) -> String {
        match self {
            PortalError::Unauthenticated => "Please log in to continue".to_string(),
            PortalError::Http {
                body: Some(body), ..
            } => body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| self.to_string()),
            other => other.to_string(),
        }
    }

    /// True when the caller has to go through the login flow again.
    pub fn requires_login(&self) -> bool {
        matches!(self, PortalError::Unauthenticated | PortalError::AuthExpired)
    }
}

impl From<PortalError> for String {
    fn from(err: PortalError) -> Self {
        err.user_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_message_prefers_backend_error() {
        let err = PortalError::Http {
            status: 400,
            body: Some(json!({"error": "End time must be after start time"})),
        };
        assert_eq!(err.user_message(), "End time must be after start time");
    }

    #[test]
    fn test_http_message_without_body() {
        let err = PortalError::Http {
            status: 500,
            body: None,
        };
        assert_eq!(err.user_message(), "HTTP error! status: 500");
    }

    #[test]
    fn test_requires_login() {
        assert!(PortalError::AuthExpired.requires_login());
        assert!(PortalError::Unauthenticated.requires_login());
        assert!(!PortalError::Validation("x".into()).requires_login());
    }
}
