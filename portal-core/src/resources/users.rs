use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{check_success, contains_ci, take_item, take_list};
use crate::client::ApiClient;
use crate::endpoints;
use crate::error::PortalError;
use crate::http::Transport;
use crate::session::{SessionStorage, UserProfile, UserRole};
use crate::validation::{is_blank, require_all};

/// Body for `POST /users/create/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserDraft {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub phone_number: Option<String>,
    pub user_role: String,
    pub date_of_birth: Option<String>,
    pub is_active: bool,
}

impl UserDraft {
    pub fn validate(&self) -> Result<(), PortalError> {
        require_all(
            &[
                &self.email,
                &self.password,
                &self.first_name,
                &self.last_name,
                &self.user_role,
            ],
            "Email, password, first name, last name, and role are required",
        )?;
        if UserRole::parse(&self.user_role).is_none() {
            return Err(PortalError::Validation(format!(
                "Unknown role '{}'",
                self.user_role
            )));
        }
        Ok(())
    }
}

/// Body for `PUT /users/{id}/update/`. Email and password are not editable here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub phone_number: Option<String>,
    pub user_role: String,
    pub date_of_birth: Option<String>,
    pub is_active: bool,
}

impl UserUpdate {
    pub fn from_user(user: &UserProfile) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            father_name: user.father_name.clone(),
            phone_number: user.phone_number.clone(),
            user_role: user.user_role.as_str().to_string(),
            date_of_birth: user.date_of_birth.clone(),
            is_active: user.is_active,
        }
    }

    pub fn validate(&self) -> Result<(), PortalError> {
        require_all(
            &[&self.first_name, &self.last_name, &self.user_role],
            "First name, last name, and role are required",
        )?;
        if UserRole::parse(&self.user_role).is_none() {
            return Err(PortalError::Validation(format!(
                "Unknown role '{}'",
                self.user_role
            )));
        }
        Ok(())
    }

    /// Copy the edited fields onto `user`. Call after `validate`.
    pub fn apply_to(&self, user: &mut UserProfile) {
        user.first_name = self.first_name.clone();
        user.last_name = self.last_name.clone();
        user.father_name = self.father_name.clone();
        user.phone_number = self.phone_number.clone();
        user.date_of_birth = self.date_of_birth.clone();
        user.is_active = self.is_active;
        if let Some(role) = UserRole::parse(&self.user_role) {
            user.user_role = role;
        }
        user.full_name = None;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: usize,
    pub students: usize,
    pub professors: usize,
    pub admins: usize,
}

impl UserStats {
    pub fn compute(users: &[UserProfile]) -> Self {
        let count = |role: UserRole| users.iter().filter(|u| u.user_role == role).count();
        Self {
            total: users.len(),
            students: count(UserRole::Student),
            professors: count(UserRole::Professor),
            admins: count(UserRole::Admin),
        }
    }
}

/// User administration: the loaded user list plus CRUD calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserController {
    users: Vec<UserProfile>,
}

impl UserController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> &[UserProfile] {
        &self.users
    }

    pub fn find(&self, id: i64) -> Option<&UserProfile> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn stats(&self) -> UserStats {
        UserStats::compute(&self.users)
    }

    /// Users whose names or email contain `search` (case-insensitive),
    /// optionally restricted to one role.
    pub fn filter(&self, search: &str, role: Option<UserRole>) -> Vec<&UserProfile> {
        let needle = search.trim().to_lowercase();
        self.users
            .iter()
            .filter(|u| {
                is_blank(&needle)
                    || u.full_name.as_deref().is_some_and(|n| contains_ci(n, &needle))
                    || contains_ci(&u.first_name, &needle)
                    || contains_ci(&u.last_name, &needle)
                    || contains_ci(&u.email, &needle)
            })
            .filter(|u| role.map_or(true, |r| u.user_role == r))
            .collect()
    }

    pub async fn load<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
    ) -> Result<&[UserProfile], PortalError> {
        let value: Value = client.get(endpoints::USERS).await?;
        self.users = take_list(value, &["users", "results"], "Failed to load users")?;
        info!("Loaded {} users", self.users.len());
        Ok(&self.users)
    }

    pub async fn fetch<T: Transport, S: SessionStorage>(
        &self,
        client: &ApiClient<T, S>,
        id: i64,
    ) -> Result<UserProfile, PortalError> {
        let value: Value = client.get(&endpoints::user_detail(id)).await?;
        // The detail endpoint may return the user bare or wrapped.
        if value.get("user").is_some() {
            take_item(value, "user", "Failed to load user details")
        } else {
            serde_json::from_value(value)
                .map_err(|e| PortalError::Protocol(format!("Invalid user in response: {}", e)))
        }
    }

    pub async fn create<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        draft: &UserDraft,
    ) -> Result<UserProfile, PortalError> {
        draft.validate()?;
        let value: Value = client.post(endpoints::USER_CREATE, draft).await?;
        let user: UserProfile = take_item(value, "user", "Failed to create user")?;
        info!("Created user {}", user.id);
        self.users.push(user.clone());
        Ok(user)
    }

    pub async fn update<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        id: i64,
        update: &UserUpdate,
    ) -> Result<UserProfile, PortalError> {
        update.validate()?;
        let value: Value = client.put(&endpoints::user_update(id), update).await?;
        check_success(&value, "Failed to update user")?;

        // The backend may answer with just `success`; then patch our copy,
        // or fetch the user when it was never loaded.
        let echoed = value.get("user").is_some_and(Value::is_object);
        let user = if echoed {
            take_item(value, "user", "Failed to update user")?
        } else if let Some(cached) = self.find(id) {
            let mut user = cached.clone();
            update.apply_to(&mut user);
            user
        } else {
            self.fetch(client, id).await?
        };

        match self.users.iter_mut().find(|u| u.id == id) {
            Some(slot) => *slot = user.clone(),
            None => self.users.push(user.clone()),
        }
        info!("Updated user {}", id);
        Ok(user)
    }

    pub async fn delete<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        id: i64,
    ) -> Result<(), PortalError> {
        let value: Value = client.delete(&endpoints::user_delete(id)).await?;
        check_success(&value, "Failed to delete user")?;
        self.users.retain(|u| u.id != id);
        info!("Deleted user {}", id);
        Ok(())
    }

    /// Replace the list, for callers that fetched it elsewhere.
    pub fn set_users(&mut self, users: Vec<UserProfile>) {
        self.users = users;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(id: i64, first: &str, last: &str, email: &str, role: UserRole) -> UserProfile {
        UserProfile {
            id,
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            user_role: role,
            father_name: None,
            phone_number: None,
            date_of_birth: None,
            full_name: None,
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn make_controller() -> UserController {
        let mut controller = UserController::new();
        controller.set_users(vec![
            make_user(1, "Ada", "Lovelace", "ada@uni.edu", UserRole::Admin),
            make_user(2, "Alan", "Turing", "alan@uni.edu", UserRole::Professor),
            make_user(3, "Grace", "Hopper", "grace@uni.edu", UserRole::Student),
            make_user(4, "Edsger", "Dijkstra", "ed@uni.edu", UserRole::Student),
        ]);
        controller
    }

    #[test]
    fn test_stats() {
        let stats = make_controller().stats();
        assert_eq!(
            stats,
            UserStats {
                total: 4,
                students: 2,
                professors: 1,
                admins: 1
            }
        );
    }

    #[test]
    fn test_filter_by_search_and_role() {
        let controller = make_controller();

        let ids = |users: Vec<&UserProfile>| users.iter().map(|u| u.id).collect::<Vec<_>>();
        assert_eq!(ids(controller.filter("", None)), vec![1, 2, 3, 4]);
        assert_eq!(ids(controller.filter("TURING", None)), vec![2]);
        assert_eq!(ids(controller.filter("uni.edu", Some(UserRole::Student))), vec![3, 4]);
        assert_eq!(ids(controller.filter("a", Some(UserRole::Admin))), vec![1]);
        assert!(controller.filter("nobody", None).is_empty());
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = UserDraft {
            email: "new@uni.edu".into(),
            password: "secret123".into(),
            first_name: "New".into(),
            last_name: "Person".into(),
            user_role: "student".into(),
            ..UserDraft::default()
        };
        assert!(draft.validate().is_ok());

        draft.password.clear();
        assert!(matches!(draft.validate(), Err(PortalError::Validation(_))));

        draft.password = "secret123".into();
        draft.user_role = "dean".into();
        assert!(matches!(draft.validate(), Err(PortalError::Validation(_))));
    }

    #[test]
    fn test_update_from_user() {
        let user = make_user(2, "Alan", "Turing", "alan@uni.edu", UserRole::Professor);
        let update = UserUpdate::from_user(&user);
        assert_eq!(update.user_role, "professor");
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_update_apply_to() {
        let mut user = make_user(2, "Alan", "Turing", "alan@uni.edu", UserRole::Professor);
        user.full_name = Some("Alan Turing".into());
        let mut update = UserUpdate::from_user(&user);
        update.first_name = "Alan M.".into();
        update.user_role = "admin".into();

        update.apply_to(&mut user);

        assert_eq!(user.display_name(), "Alan M. Turing");
        assert_eq!(user.user_role, UserRole::Admin);
        assert_eq!(user.email, "alan@uni.edu");
    }
}
