//! Controllers for the backend's CRUD resources.
//!
//! Each controller owns the list it last loaded; nothing here is global.
//! Backend responses are wrapped in an envelope of the form
//! `{"success": bool, "error"?: string, "<payload key>": ...}`.

pub mod courses;
pub mod events;
pub mod lessons;
pub mod profile;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::PortalError;

pub use courses::{Course, CourseController, CourseDraft, CourseStats, StatusFilter};
pub use events::{Event, EventController, EventCreator, EventDraft, EventPriority, EventType};
pub use lessons::{Lesson, LessonController, LessonDraft};
pub use profile::{PasswordChange, ProfileController, ProfileUpdate};
pub use users::{UserController, UserDraft, UserStats, UserUpdate};

/// Fail with `Rejected` when the envelope reports `success: false`.
/// An envelope without a `success` field is accepted.
pub(crate) fn check_success(value: &Value, default_error: &str) -> Result<(), PortalError> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or(default_error)
            .to_string();
        return Err(PortalError::Rejected(message));
    }
    Ok(())
}

/// Deserialize the payload under `key` from a successful envelope.
pub(crate) fn take_item<T: DeserializeOwned>(
    mut value: Value,
    key: &str,
    default_error: &str,
) -> Result<T, PortalError> {
    check_success(&value, default_error)?;
    let item = value
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| PortalError::Protocol(format!("Response is missing '{}'", key)))?;
    serde_json::from_value(item)
        .map_err(|e| PortalError::Protocol(format!("Invalid '{}' in response: {}", key, e)))
}

/// Deserialize the list under the first of `keys` present; an envelope
/// carrying none of them is an empty list.
pub(crate) fn take_list<T: DeserializeOwned>(
    mut value: Value,
    keys: &[&str],
    default_error: &str,
) -> Result<Vec<T>, PortalError> {
    check_success(&value, default_error)?;
    let Some(list) = keys
        .iter()
        .find_map(|k| value.get_mut(*k).filter(|v| !v.is_null()).map(Value::take))
    else {
        return Ok(Vec::new());
    };
    serde_json::from_value(list)
        .map_err(|e| PortalError::Protocol(format!("Invalid list in response: {}", e)))
}

/// Case-insensitive substring match used by the list searches.
pub(crate) fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
