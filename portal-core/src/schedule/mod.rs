//! Calendar views over the loaded events.

pub mod agenda;
pub mod calendar;

pub use agenda::{Agenda, EventStats};
pub use calendar::{CalendarMonth, DayCell, GRID_CELLS, MAX_PREVIEWS};
