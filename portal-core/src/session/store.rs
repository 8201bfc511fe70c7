use tracing::{info, warn};

use super::storage::SessionStorage;
use super::types::{Session, UserProfile};
use crate::error::PortalError;

/// Reads and writes the persisted [`Session`] record.
///
/// The whole record is replaced on every save. Execution is single-threaded,
/// so a load/modify/save sequence never interleaves with another writer.
pub struct SessionStore<S> {
    storage: S,
    key: String,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current session. Missing, unreadable or malformed data yields the
    /// unauthenticated default instead of an error.
    pub fn load(&self) -> Session {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Session::default(),
            Err(e) => {
                warn!("Failed to read stored session: {}", e);
                return Session::default();
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(mut session) => {
                if session.is_authenticated && session.access_token.is_none() {
                    warn!("Stored session claims authentication without a token, ignoring flag");
                    session.is_authenticated = false;
                }
                session
            }
            Err(e) => {
                warn!("Failed to parse stored session: {}", e);
                Session::default()
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), PortalError> {
        let json = serde_json::to_string(session)
            .map_err(|e| PortalError::Storage(format!("Failed to serialize session: {}", e)))?;
        self.storage.set_item(&self.key, &json)
    }

    pub fn clear(&self) -> Result<(), PortalError> {
        info!("Clearing stored session");
        self.storage.remove_item(&self.key)
    }

    /// Replace the access token after a refresh. The refresh token and user
    /// are left as they were.
    pub fn update_access_token(&self, access_token: &str) -> Result<(), PortalError> {
        let mut session = self.load();
        session.access_token = Some(access_token.to_string());
        session.is_authenticated = true;
        self.save(&session)
    }

    /// Replace the stored user after a profile edit, keeping the tokens.
    pub fn update_user(&self, user: UserProfile) -> Result<(), PortalError> {
        let mut session = self.load();
        if !session.is_authenticated() {
            return Err(PortalError::Unauthenticated);
        }
        session.user = Some(user);
        self.save(&session)
    }

    pub fn access_token(&self) -> Option<String> {
        self.load().access_token
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        let session = self.load();
        if session.is_authenticated() {
            session.user
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStorage;
    use crate::session::types::UserRole;

    fn make_user() -> UserProfile {
        UserProfile {
            id: 7,
            email: "prof@uni.edu".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            user_role: UserRole::Professor,
            father_name: None,
            phone_number: Some("+1 555 0100".to_string()),
            date_of_birth: None,
            full_name: None,
            is_active: true,
            created_at: "2024-01-01T09:00:00+00:00".to_string(),
            updated_at: "2024-02-01T09:00:00+00:00".to_string(),
        }
    }

    fn make_store() -> SessionStore<MemoryStorage> {
        SessionStore::new(MemoryStorage::new(), "authState")
    }

    #[test]
    fn test_round_trip_with_user() {
        let store = make_store();
        let session = Session::authenticated(make_user(), "access".into(), Some("refresh".into()));

        store.save(&session).unwrap();
        assert_eq!(store.load(), session);
    }

    #[test]
    fn test_round_trip_with_null_user() {
        let store = make_store();
        let session = Session {
            is_authenticated: true,
            user: None,
            access_token: Some("access".into()),
            refresh_token: None,
        };

        store.save(&session).unwrap();
        assert_eq!(store.load(), session);

        let empty = Session::default();
        store.save(&empty).unwrap();
        assert_eq!(store.load(), empty);
    }

    #[test]
    fn test_missing_record_is_unauthenticated() {
        let store = make_store();
        let session = store.load();
        assert!(!session.is_authenticated());
        assert!(session.access_token.is_none());
    }

    #[test]
    fn test_malformed_record_is_unauthenticated() {
        let store = make_store();
        store.storage().set_item("authState", "{not json").unwrap();
        assert_eq!(store.load(), Session::default());

        store.storage().set_item("authState", "[1,2,3]").unwrap();
        assert_eq!(store.load(), Session::default());
    }

    #[test]
    fn test_flag_without_token_is_dropped_on_load() {
        let store = make_store();
        store
            .storage()
            .set_item("authState", r#"{"isAuthenticated":true,"user":null}"#)
            .unwrap();
        let session = store.load();
        assert!(!session.is_authenticated);
    }

    #[test]
    fn test_clear_removes_record() {
        let store = make_store();
        store
            .save(&Session::authenticated(make_user(), "a".into(), None))
            .unwrap();
        store.clear().unwrap();
        assert!(store.storage().get_item("authState").unwrap().is_none());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_update_access_token_keeps_refresh_token() {
        let store = make_store();
        store
            .save(&Session::authenticated(make_user(), "old".into(), Some("refresh".into())))
            .unwrap();

        store.update_access_token("new").unwrap();

        let session = store.load();
        assert_eq!(session.access_token.as_deref(), Some("new"));
        assert_eq!(session.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(session.user, Some(make_user()));
    }

    #[test]
    fn test_update_user_requires_session() {
        let store = make_store();
        assert!(matches!(
            store.update_user(make_user()),
            Err(PortalError::Unauthenticated)
        ));

        store
            .save(&Session::authenticated(make_user(), "a".into(), None))
            .unwrap();
        let mut renamed = make_user();
        renamed.first_name = "Amazing".to_string();
        store.update_user(renamed).unwrap();
        assert_eq!(store.current_user().unwrap().first_name, "Amazing");
        assert_eq!(store.access_token().as_deref(), Some("a"));
    }
}
