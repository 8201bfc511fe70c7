//! What the current session is allowed to see and do.

use std::collections::BTreeSet;

use crate::error::PortalError;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    LogIn,
    LogOut,
    ViewDashboard,
    ViewUsers,
    ManageUsers,
    ViewCourses,
    ManageCourses,
    ManageLessons,
    ViewSchedule,
    ManageEvents,
    EditProfile,
}

const MEMBER: [Capability; 8] = [
    Capability::ViewDashboard,
    Capability::ViewUsers,
    Capability::ManageUsers,
    Capability::ViewCourses,
    Capability::ViewSchedule,
    Capability::ManageEvents,
    Capability::EditProfile,
    Capability::LogOut,
];

const STAFF: [Capability; 2] = [Capability::ManageCourses, Capability::ManageLessons];

/// Capabilities granted to `session`. Logged-out sessions may only log in.
pub fn visible_actions(session: &Session) -> BTreeSet<Capability> {
    let Some(role) = session.role() else {
        if session.is_authenticated() {
            // Token without a stored user: treat as the least privileged member.
            return MEMBER.into_iter().collect();
        }
        return BTreeSet::from([Capability::LogIn]);
    };

    let mut actions: BTreeSet<Capability> = MEMBER.into_iter().collect();
    if role.is_staff() {
        actions.extend(STAFF);
    }
    actions
}

pub fn can(session: &Session, capability: Capability) -> bool {
    visible_actions(session).contains(&capability)
}

/// Fail unless `session` holds `capability`. `action` names the attempted
/// operation in the error, e.g. "create courses".
pub fn require(session: &Session, capability: Capability, action: &str) -> Result<(), PortalError> {
    if !session.is_authenticated() {
        return Err(PortalError::Unauthenticated);
    }
    if !can(session, capability) {
        return Err(PortalError::PermissionDenied(action.to_string()));
    }
    Ok(())
}
