use chrono::{Datelike, Duration, Month, NaiveDate};

use super::agenda::Agenda;

/// Cells in a month view: six Monday-first weeks.
pub const GRID_CELLS: usize = 42;

/// Most event previews shown inside one day cell.
pub const MAX_PREVIEWS: usize = 3;

/// One day in the month grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub other_month: bool,
    pub is_today: bool,
    pub event_count: usize,
    pub previews: Vec<String>,
}

impl DayCell {
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn has_events(&self) -> bool {
        self.event_count > 0
    }
}

/// The month currently shown by the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    /// `month` is 1-based; out-of-range values are clamped.
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month: month.clamp(1, 12),
        }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// "May 2024".
    pub fn title(&self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("");
        format!("{} {}", name, self.year)
    }

    fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The 42 cells of the month view, starting on the Monday on or before
    /// the 1st.
    pub fn grid(&self, today: NaiveDate, agenda: &Agenda) -> Vec<DayCell> {
        let first = self.first_day();
        let lead = i64::from(first.weekday().num_days_from_monday());
        let start = first - Duration::days(lead);

        start
            .iter_days()
            .take(GRID_CELLS)
            .map(|date| {
                let events = agenda.on(date);
                DayCell {
                    date,
                    other_month: date.month() != self.month || date.year() != self.year,
                    is_today: date == today,
                    event_count: events.len(),
                    previews: events
                        .iter()
                        .take(MAX_PREVIEWS)
                        .map(|e| match e.start() {
                            Some(start) if !e.is_all_day => {
                                format!("{} - {}", e.title, start.format("%H:%M"))
                            }
                            _ => format!("{} - All day", e.title),
                        })
                        .collect(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Event;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_may_2024_grid() {
        let month = CalendarMonth::new(2024, 5);
        let cells = month.grid(date(2024, 5, 15), &Agenda::default());

        assert_eq!(cells.len(), GRID_CELLS);
        // May 1st 2024 is a Wednesday.
        assert!(cells[0].other_month);
        assert!(cells[1].other_month);
        assert_eq!(cells[0].date, date(2024, 4, 29));
        assert!(!cells[2].other_month);
        assert_eq!(cells[2].date, date(2024, 5, 1));
        assert!(cells[16].is_today);
        assert_eq!(cells.iter().filter(|c| c.is_today).count(), 1);
        assert_eq!(cells.iter().filter(|c| !c.other_month).count(), 31);
        assert!(cells[41].other_month);
    }

    #[test]
    fn test_month_starting_monday_has_no_lead() {
        // April 2024 starts on a Monday.
        let cells = CalendarMonth::new(2024, 4).grid(date(2000, 1, 1), &Agenda::default());
        assert_eq!(cells[0].date, date(2024, 4, 1));
        assert!(!cells[0].other_month);
    }

    #[test]
    fn test_navigation_wraps_years() {
        let jan = CalendarMonth::new(2025, 1);
        assert_eq!(jan.previous(), CalendarMonth::new(2024, 12));
        assert_eq!(jan.previous().next(), jan);
        assert_eq!(CalendarMonth::new(2024, 12).next().title(), "January 2025");
        assert_eq!(CalendarMonth::new(2024, 5).title(), "May 2024");
    }

    #[test]
    fn test_previews_capped_at_three() {
        let events: Vec<Event> = (1..=5)
            .map(|i| {
                serde_json::from_value(json!({
                    "id": i,
                    "title": format!("E{}", i),
                    "assigned_date": "2024-05-01",
                    "start_time": if i == 5 { None } else { Some(format!("0{}:00:00", i)) },
                }))
                .unwrap()
            })
            .collect();
        let agenda = Agenda::organize(&events);
        let cells = CalendarMonth::new(2024, 5).grid(date(2024, 5, 1), &agenda);
        let may1 = &cells[2];

        assert_eq!(may1.event_count, 5);
        assert_eq!(may1.previews, vec!["E1 - 01:00", "E2 - 02:00", "E3 - 03:00"]);
        assert!(may1.has_events());
        assert!(!cells[3].has_events());
    }
}
