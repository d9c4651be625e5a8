//! Booking information assembled from a finished schedule.
//!
//! Each distinct scheduled activity gets one [`BookingEntry`] holding its
//! display attributes, a booking link from a [`BookingUrlResolver`], and
//! every date/block it was scheduled into.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{Schedule, TimeBlock, scheduled_activities};
use crate::suggest::GenerationError;

/// Booking details keyed by activity name.
///
/// Iteration is alphabetical. Consumers that care about itinerary order
/// sort by each entry's first [`Occurrence`], as alert generation does.
pub type BookingInfo = BTreeMap<String, BookingEntry>;

/// Display-ready booking details for one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingEntry {
    pub price_range: String,
    pub booking_url: String,
    pub duration: String,
    pub category: String,
    /// A block name, or `"Flexible"`.
    pub preferred_time: String,
    /// Chronological; the first one drives the booking deadline.
    pub occurrences: Vec<Occurrence>,
}

/// One scheduled appearance of an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    /// ISO `YYYY-MM-DD`. Kept as text because entries may come from outside
    /// and a bad date should only void its own entry.
    pub date: String,
    pub timeblock: TimeBlock,
}

/// Looks up where an activity can be booked.
pub trait BookingUrlResolver {
    fn booking_url(&self, activity_name: &str, destination: &str) -> Result<String, GenerationError>;
}

/// Collect booking details for every activity placed in `schedule`.
///
/// The resolver is consulted once per distinct activity name. A failed
/// lookup is logged and leaves the entry's `booking_url` empty.
pub fn build_booking_info(
    schedule: &Schedule,
    destination: &str,
    resolver: &dyn BookingUrlResolver,
) -> BookingInfo {
    let mut info = BookingInfo::new();

    for (date, block, activity) in scheduled_activities(schedule) {
        let entry = match info.entry(activity.name.clone()) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                let booking_url = match resolver.booking_url(&activity.name, destination) {
                    Ok(url) => url,
                    Err(e) => {
                        warn!(activity = %activity.name, error = %e, "booking URL lookup failed");
                        String::new()
                    }
                };
                debug!(activity = %activity.name, url = %booking_url, "booking entry created");
                slot.insert(BookingEntry {
                    price_range: activity.price.to_string(),
                    booking_url,
                    duration: format!("{} hours", activity.duration_hours),
                    category: activity.category.clone(),
                    preferred_time: activity
                        .preferred_time
                        .map_or_else(|| "Flexible".to_owned(), |b| b.to_string()),
                    occurrences: Vec::new(),
                })
            }
        };
        entry.occurrences.push(Occurrence {
            date: date.format("%Y-%m-%d").to_string(),
            timeblock: block,
        });
    }

    info
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::NaiveDate;

    use super::*;
    use crate::model::{Activity, DaySchedule, PriceRange};

    /// Records every lookup and fails for names starting with "x".
    #[derive(Default)]
    struct RecordingResolver {
        calls: RefCell<Vec<String>>,
    }

    impl BookingUrlResolver for RecordingResolver {
        fn booking_url(&self, name: &str, destination: &str) -> Result<String, GenerationError> {
            self.calls.borrow_mut().push(name.to_owned());
            if name.starts_with('x') {
                return Err(GenerationError::Service("offline".into()));
            }
            Ok(format!("https://book.example/{destination}/{name}"))
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn one_entry_per_name_with_all_occurrences() {
        let fado = Activity::new("fado", 2.0, "Music", PriceRange::new(30.0, 40.0))
            .preferred_time(TimeBlock::Evening);
        let mut d1 = DaySchedule::default();
        d1.set(TimeBlock::Evening, fado.clone());
        let mut d2 = DaySchedule::default();
        d2.set(TimeBlock::Evening, fado);
        let mut schedule = Schedule::new();
        schedule.insert(date(2), d2);
        schedule.insert(date(1), d1);

        let resolver = RecordingResolver::default();
        let info = build_booking_info(&schedule, "lisbon", &resolver);

        assert_eq!(*resolver.calls.borrow(), vec!["fado".to_string()]);
        let entry = &info["fado"];
        assert_eq!(entry.booking_url, "https://book.example/lisbon/fado");
        assert_eq!(entry.price_range, "$30-$40");
        assert_eq!(entry.duration, "2 hours");
        assert_eq!(entry.preferred_time, "evening");
        let dates: Vec<&str> = entry.occurrences.iter().map(|o| o.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-06-01", "2025-06-02"]);
    }

    #[test]
    fn failed_lookup_leaves_url_empty() {
        let mut day = DaySchedule::default();
        day.set(
            TimeBlock::Morning,
            Activity::new("xmuseum", 1.5, "Cultural", PriceRange::fixed(12.0)),
        );
        let mut schedule = Schedule::new();
        schedule.insert(date(1), day);

        let info = build_booking_info(&schedule, "lisbon", &RecordingResolver::default());
        let entry = &info["xmuseum"];
        assert!(entry.booking_url.is_empty());
        assert_eq!(entry.preferred_time, "Flexible");
        assert_eq!(entry.duration, "1.5 hours");
    }

    #[test]
    fn empty_schedule_has_no_entries() {
        let mut schedule = Schedule::new();
        schedule.insert(date(1), DaySchedule::default());
        assert!(build_booking_info(&schedule, "lisbon", &RecordingResolver::default()).is_empty());
    }
}
