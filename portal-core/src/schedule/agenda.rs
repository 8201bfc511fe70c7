use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::resources::Event;

/// Events grouped by day, each day ordered by start time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Agenda {
    days: BTreeMap<NaiveDate, Vec<Event>>,
}

impl Agenda {
    /// Group `events` by their assigned date. Within a day, timed events come
    /// first by ascending start; untimed ones follow in their original order.
    pub fn organize(events: &[Event]) -> Self {
        let mut days: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
        for event in events {
            days.entry(event.assigned_date)
                .or_default()
                .push(event.clone());
        }
        for day in days.values_mut() {
            day.sort_by(compare_start);
        }
        Self { days }
    }

    pub fn on(&self, date: NaiveDate) -> &[Event] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn days(&self) -> impl Iterator<Item = (&NaiveDate, &[Event])> {
        self.days.iter().map(|(date, events)| (date, events.as_slice()))
    }

    /// Number of days that have at least one event.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

fn start_text(event: &Event) -> Option<&str> {
    event
        .start_time
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Events with any start time come before those without. Two parsable
/// times compare as times; otherwise the raw strings are compared.
fn compare_start(a: &Event, b: &Event) -> Ordering {
    match (start_text(a), start_text(b)) {
        (Some(x), Some(y)) => match (a.start(), b.start()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Counters shown above the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventStats {
    pub total: usize,
    pub today: usize,
    /// Events from today through seven days ahead, both ends included.
    pub this_week: usize,
    pub mine: usize,
}

impl EventStats {
    pub fn compute(events: &[Event], today: NaiveDate, current_user: Option<i64>) -> Self {
        let week_end = today + Duration::days(7);
        Self {
            total: events.len(),
            today: events.iter().filter(|e| e.assigned_date == today).count(),
            this_week: events
                .iter()
                .filter(|e| e.assigned_date >= today && e.assigned_date <= week_end)
                .count(),
            mine: current_user.map_or(0, |id| events.iter().filter(|e| e.is_created_by(id)).count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_event(id: i64, date: &str, start: Option<&str>, creator: i64) -> Event {
        serde_json::from_value(json!({
            "id": id,
            "title": format!("Event {}", id),
            "assigned_date": date,
            "start_time": start,
            "creator": {"id": creator},
        }))
        .unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ids(events: &[Event]) -> Vec<i64> {
        events.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_organize_groups_and_sorts_by_start() {
        let events = vec![
            make_event(1, "2024-05-01", Some("09:00"), 1),
            make_event(2, "2024-05-01", Some("08:00"), 1),
            make_event(3, "2024-05-02", None, 1),
        ];
        let agenda = Agenda::organize(&events);

        assert_eq!(agenda.len(), 2);
        assert_eq!(ids(agenda.on(date("2024-05-02"))), vec![3]);
        assert_eq!(ids(agenda.on(date("2024-05-01"))), vec![2, 1]);
        assert!(agenda.on(date("2024-05-03")).is_empty());
    }

    #[test]
    fn test_untimed_events_last_and_stable() {
        let events = vec![
            make_event(1, "2024-05-01", None, 1),
            make_event(2, "2024-05-01", Some("13:00:00"), 1),
            make_event(3, "2024-05-01", None, 1),
            make_event(4, "2024-05-01", Some("07:30"), 1),
        ];
        let agenda = Agenda::organize(&events);
        assert_eq!(ids(agenda.on(date("2024-05-01"))), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_unparsable_start_still_counts_as_timed() {
        let events = vec![
            make_event(1, "2024-05-01", None, 1),
            make_event(2, "2024-05-01", Some("morning"), 1),
            make_event(3, "2024-05-01", Some("  "), 1),
            make_event(4, "2024-05-01", Some("08:15"), 1),
        ];
        let agenda = Agenda::organize(&events);
        assert_eq!(ids(agenda.on(date("2024-05-01"))), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_stats_window_is_inclusive() {
        let events = vec![
            make_event(1, "2024-05-10", None, 7),
            make_event(2, "2024-05-17", None, 7),
            make_event(3, "2024-05-18", None, 8),
            make_event(4, "2024-05-09", None, 8),
        ];
        let stats = EventStats::compute(&events, date("2024-05-10"), Some(7));
        assert_eq!(
            stats,
            EventStats {
                total: 4,
                today: 1,
                this_week: 2,
                mine: 2
            }
        );
    }
}
