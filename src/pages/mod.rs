pub mod course_detail;
pub mod courses;
pub mod home;
pub mod schedule;
pub mod settings;
pub mod users;
