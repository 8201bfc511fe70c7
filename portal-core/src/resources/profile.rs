use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{check_success, take_item};
use crate::client::ApiClient;
use crate::endpoints;
use crate::error::PortalError;
use crate::http::Transport;
use crate::session::{SessionStorage, UserProfile};
use crate::validation::{is_blank, require_all, MIN_PASSWORD_LEN};

/// Body for `PUT /users/profile/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
}

impl ProfileUpdate {
    pub fn from_user(user: &UserProfile) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            father_name: user.father_name.clone(),
            date_of_birth: user.date_of_birth.clone(),
            phone_number: user.phone_number.clone(),
            is_active: user.is_active,
        }
    }

    pub fn validate(&self) -> Result<(), PortalError> {
        if is_blank(&self.first_name) || is_blank(&self.last_name) {
            return Err(PortalError::Validation(
                "First name and last name are required.".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy the edited fields onto `user`.
    pub fn apply_to(&self, user: &mut UserProfile) {
        user.first_name = self.first_name.clone();
        user.last_name = self.last_name.clone();
        user.father_name = self.father_name.clone();
        user.date_of_birth = self.date_of_birth.clone();
        user.phone_number = self.phone_number.clone();
        user.is_active = self.is_active;
        user.full_name = None;
    }
}

/// Body for `POST /users/change-password/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    pub fn validate(&self) -> Result<(), PortalError> {
        require_all(
            &[
                &self.current_password,
                &self.new_password,
                &self.confirm_password,
            ],
            "All password fields are required.",
        )?;
        if self.new_password != self.confirm_password {
            return Err(PortalError::Validation(
                "New passwords do not match.".to_string(),
            ));
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PortalError::Validation(format!(
                "New password must be at least {} characters long.",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

/// The logged-in user's own account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileController {
    profile: Option<UserProfile>,
}

impl ProfileController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub async fn load<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
    ) -> Result<&UserProfile, PortalError> {
        let value: Value = client.get(endpoints::PROFILE).await?;
        let user: UserProfile = take_item(value, "user", "Failed to load profile")?;
        Ok(self.profile.insert(user))
    }

    /// Save the profile and refresh the user kept in the session.
    pub async fn update<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, PortalError> {
        update.validate()?;
        let value: Value = client.put(endpoints::PROFILE, update).await?;
        check_success(&value, "Failed to update profile")?;

        // Prefer the user echoed back by the backend, otherwise patch our copy.
        let echoed = value.get("user").is_some_and(Value::is_object);
        let user = if echoed {
            take_item(value, "user", "Failed to update profile")?
        } else {
            let mut user = self
                .profile
                .clone()
                .or_else(|| client.current_user())
                .ok_or(PortalError::Unauthenticated)?;
            update.apply_to(&mut user);
            user
        };

        client.session_store().update_user(user.clone())?;
        info!("Profile updated for {}", user.email);
        self.profile = Some(user.clone());
        Ok(user)
    }

    pub async fn change_password<T: Transport, S: SessionStorage>(
        &self,
        client: &ApiClient<T, S>,
        change: &PasswordChange,
    ) -> Result<(), PortalError> {
        change.validate()?;
        let value: Value = client.post(endpoints::CHANGE_PASSWORD, change).await?;
        check_success(&value, "Failed to change password")?;
        info!("Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_change(new: &str, confirm: &str) -> PasswordChange {
        PasswordChange {
            current_password: "old-password".into(),
            new_password: new.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn test_password_change_rules() {
        assert!(make_change("longenough", "longenough").validate().is_ok());

        let err = make_change("longenough", "different1").validate().unwrap_err();
        assert_eq!(err.to_string(), "New passwords do not match.");

        let err = make_change("short", "short").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "New password must be at least 8 characters long."
        );

        let mut change = make_change("longenough", "longenough");
        change.current_password.clear();
        assert!(change.validate().is_err());
    }

    #[test]
    fn test_profile_update_requires_names() {
        let update = ProfileUpdate {
            first_name: "Ada".into(),
            last_name: "".into(),
            ..ProfileUpdate::default()
        };
        assert!(matches!(update.validate(), Err(PortalError::Validation(_))));
    }
}
