//! Accepted events and their ordering.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A validated submission, stripped of who sent it and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,
    pub start: NaiveDateTime,
    /// `None` for open-ended events.
    pub end: Option<NaiveDateTime>,
    pub location: String,
    /// Trimmed link, empty when none was given.
    pub link: String,
}

/// Order events by start time. Events starting together keep sheet order.
pub fn rank_events(events: &mut [Event]) {
    events.sort_by_key(|event| event.start);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(name: &str, day: u32, hour: u32) -> Event {
        Event {
            event_type: name.to_string(),
            start: NaiveDate::from_ymd_opt(2016, 7, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            end: None,
            location: "Park".to_string(),
            link: String::new(),
        }
    }

    #[test]
    fn test_rank_orders_by_start() {
        let mut events = vec![
            event("late", 31, 9),
            event("early", 30, 21),
            event("mid", 31, 8),
        ];
        rank_events(&mut events);

        let names: Vec<_> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(names, vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_rank_keeps_sheet_order_for_ties() {
        let mut events = vec![
            event("first", 30, 9),
            event("other", 29, 9),
            event("second", 30, 9),
            event("third", 30, 9),
        ];
        rank_events(&mut events);

        let names: Vec<_> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(names, vec!["other", "first", "second", "third"]);
    }
}
