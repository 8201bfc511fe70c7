pub mod calendar_grid;
pub mod fields;
pub mod login_form;
pub mod notifications;
pub mod sidebar;
pub mod stat_card;
