use serde::{Deserialize, Serialize};

use crate::session::UserProfile;

/// Shown when the backend refuses a login without saying why.
pub const DEFAULT_LOGIN_ERROR: &str = "Login failed. Please check your credentials.";

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl RefreshResponse {
    /// The new token, if the backend reported success and sent one.
    pub fn into_token(self) -> Option<String> {
        match (self.success, self.access_token) {
            (true, Some(token)) if !token.is_empty() => Some(token),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_response_requires_success_and_token() {
        let ok: RefreshResponse =
            serde_json::from_str(r#"{"success":true,"access_token":"t"}"#).unwrap();
        assert_eq!(ok.into_token().as_deref(), Some("t"));

        let no_token: RefreshResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(no_token.into_token().is_none());

        let failed: RefreshResponse =
            serde_json::from_str(r#"{"success":false,"access_token":"t"}"#).unwrap();
        assert!(failed.into_token().is_none());
    }

    #[test]
    fn test_login_failure_shape() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"success":false,"error":"Invalid credentials"}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.user.is_none());
        assert_eq!(resp.error.as_deref(), Some("Invalid credentials"));
    }
}
