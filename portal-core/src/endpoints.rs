//! REST paths served by the portal backend, relative to the configured base URL.

pub const LOGIN: &str = "/users/login/";
pub const REFRESH_TOKEN: &str = "/users/refresh-token/";
pub const PROFILE: &str = "/users/profile/";
pub const CHANGE_PASSWORD: &str = "/users/change-password/";

pub const USERS: &str = "/users/";
pub const USER_CREATE: &str = "/users/create/";
pub const COURSES: &str = "/courses/";
pub const COURSE_CREATE: &str = "/courses/create/";
pub const LESSON_CREATE: &str = "/courses/lessons/create/";
pub const EVENTS: &str = "/schedule/events/";
pub const EVENT_CREATE: &str = "/schedule/events/create/";

pub fn user_detail(id: i64) -> String {
    format!("/users/{}/", id)
}

pub fn user_update(id: i64) -> String {
    format!("/users/{}/update/", id)
}

pub fn user_delete(id: i64) -> String {
    format!("/users/{}/delete/", id)
}

pub fn course_detail(id: i64) -> String {
    format!("/courses/{}/", id)
}

pub fn course_update(id: i64) -> String {
    format!("/courses/{}/update/", id)
}

pub fn course_delete(id: i64) -> String {
    format!("/courses/{}/delete/", id)
}

pub fn lessons_for_course(course_id: i64) -> String {
    format!("/courses/lessons/?course={}", course_id)
}

pub fn lesson_update(id: i64) -> String {
    format!("/courses/lessons/{}/update/", id)
}

pub fn lesson_delete(id: i64) -> String {
    format!("/courses/lessons/{}/delete/", id)
}

pub fn event_detail(id: i64) -> String {
    format!("/schedule/events/{}/", id)
}

pub fn event_update(id: i64) -> String {
    format!("/schedule/events/{}/update/", id)
}

pub fn event_delete(id: i64) -> String {
    format!("/schedule/events/{}/delete/", id)
}
