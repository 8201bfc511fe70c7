use serde::{Deserialize, Serialize};
use std::fmt;

/// Role assigned to a portal account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Professor,
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Student, UserRole::Professor, UserRole::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Professor => "professor",
            UserRole::Admin => "admin",
        }
    }

    /// Parse the wire value; anything unknown is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "student" => Some(UserRole::Student),
            "professor" => Some(UserRole::Professor),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Professors and admins may manage courses and lessons.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Professor | UserRole::Admin)
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Student => "Student",
            UserRole::Professor => "Professor",
            UserRole::Admin => "Admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A portal account as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl UserProfile {
    /// "First Last", preferring the backend's precomputed full name.
    pub fn display_name(&self) -> String {
        match &self.full_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("{} {}", self.first_name, self.last_name)
                .trim()
                .to_string(),
        }
    }
}

/// Authentication state persisted in client-local storage.
///
/// Serialized with camelCase keys so the record stays compatible with
/// what the browser has already stored under `authState`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Session {
    /// Session created by a successful login.
    pub fn authenticated(
        user: UserProfile,
        access_token: String,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
            access_token: Some(access_token),
            refresh_token,
        }
    }

    /// Authenticated only when the flag is set and a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated && self.access_token.is_some()
    }

    pub fn role(&self) -> Option<UserRole> {
        if !self.is_authenticated() {
            return None;
        }
        self.user.as_ref().map(|u| u.user_role)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_uses_camel_case_keys() {
        let session = Session {
            is_authenticated: true,
            user: None,
            access_token: Some("a".into()),
            refresh_token: Some("r".into()),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["isAuthenticated"], true);
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
        assert!(json["user"].is_null());
    }

    #[test]
    fn test_flag_without_token_is_not_authenticated() {
        let session = Session {
            is_authenticated: true,
            ..Session::default()
        };
        assert!(!session.is_authenticated());
        assert!(session.role().is_none());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(UserRole::parse("Admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse(" professor "), Some(UserRole::Professor));
        assert_eq!(UserRole::parse("janitor"), None);
        assert!(UserRole::Professor.is_staff());
        assert!(!UserRole::Student.is_staff());
    }

    #[test]
    fn test_display_name_falls_back_to_first_last() {
        let user: UserProfile = serde_json::from_str(
            r#"{"id":1,"email":"a@b.c","first_name":"Ada","last_name":"Lovelace","user_role":"admin"}"#,
        )
        .unwrap();
        assert_eq!(user.display_name(), "Ada Lovelace");
        assert!(!user.is_active);
    }
}
