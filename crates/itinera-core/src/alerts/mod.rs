//! Trip alert timeline.
//!
//! A [`TripAlertManager`] owns every [`Alert`] for one trip and keeps them
//! sorted by timestamp. Alerts come from three sources, generated in order
//! by [`TripAlertManager::generate_trip_alerts`]:
//!
//! 1. Fixed preparation milestones before the trip starts.
//! 2. Booking deadlines, one per booking entry whose deadline is still ahead.
//! 3. Same-day reminders for every scheduled activity.

mod snapshot;

use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use itinera_store::StoreError;

use crate::booking::{BookingEntry, BookingInfo};
use crate::config::AlertSettings;
use crate::model::{Schedule, TimeBlock, scheduled_activities};

pub use snapshot::AlertSnapshot;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What an alert is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    TripStart,
    BookingDeadline,
    Activity,
    Preparation,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TripStart => "trip_start",
            Self::BookingDeadline => "booking_deadline",
            Self::Activity => "activity",
            Self::Preparation => "preparation",
        };
        f.write_str(s)
    }
}

/// How urgently an alert should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// A single reminder. Only its acknowledgement flag changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    title: String,
    description: String,
    #[serde(rename = "date")]
    timestamp: NaiveDateTime,
    #[serde(rename = "alert_type")]
    kind: AlertKind,
    priority: Priority,
    acknowledged: bool,
}

impl Alert {
    fn new(
        title: String,
        description: String,
        timestamp: NaiveDateTime,
        kind: AlertKind,
        priority: Priority,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            timestamp,
            kind,
            priority,
            acknowledged: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from building, restoring or persisting an alert manager.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("trip start {start} is after trip end {end}")]
    InvalidTripRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("{setting} of {days} days is out of range")]
    OutOfRange { setting: &'static str, days: i64 },

    #[error("malformed alert snapshot: {0}")]
    Format(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Days before trip start, title, description and priority of each
/// preparation milestone.
const PREPARATION_MILESTONES: [(i64, &str, &str, Priority); 3] = [
    (
        30,
        "Start Trip Planning",
        "Time to start planning your trip! Check passport validity and travel requirements.",
        Priority::High,
    ),
    (
        14,
        "Trip Preparation",
        "Check weather forecast and start packing list.",
        Priority::Normal,
    ),
    (
        3,
        "Final Preparation",
        "Confirm all reservations and prepare travel documents.",
        Priority::High,
    ),
];

/// Owns the alert timeline of one trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TripAlertManager {
    trip_start: NaiveDateTime,
    trip_end: NaiveDateTime,
    booking_lead: TimeDelta,
    upcoming_window_days: i64,
    alerts: Vec<Alert>,
}

impl TripAlertManager {
    /// Create an empty manager. Fails if `trip_start` is after `trip_end`.
    pub fn new(trip_start: NaiveDateTime, trip_end: NaiveDateTime) -> Result<Self, AlertError> {
        if trip_start > trip_end {
            return Err(AlertError::InvalidTripRange {
                start: trip_start,
                end: trip_end,
            });
        }
        let defaults = AlertSettings::default();
        Ok(Self {
            trip_start,
            trip_end,
            booking_lead: TimeDelta::days(defaults.booking_lead_days),
            upcoming_window_days: defaults.upcoming_window_days,
            alerts: Vec::new(),
        })
    }

    /// Manager for a trip running from the start of `first_day` to the start
    /// of `last_day`.
    pub fn for_dates(first_day: NaiveDate, last_day: NaiveDate) -> Result<Self, AlertError> {
        Self::new(
            first_day.and_time(chrono::NaiveTime::MIN),
            last_day.and_time(chrono::NaiveTime::MIN),
        )
    }

    /// Override how many days ahead of an activity booking alerts fire.
    ///
    /// Fails for negative leads and for leads chrono cannot represent.
    pub fn with_booking_lead_days(mut self, days: i64) -> Result<Self, AlertError> {
        self.booking_lead = TimeDelta::try_days(days)
            .filter(|lead| *lead >= TimeDelta::zero())
            .ok_or(AlertError::OutOfRange {
                setting: "booking_lead_days",
                days,
            })?;
        Ok(self)
    }

    /// Override the look-ahead of [`upcoming_alerts`](Self::upcoming_alerts).
    pub fn with_upcoming_window_days(mut self, days: i64) -> Self {
        self.upcoming_window_days = days;
        self
    }

    /// Apply configured alert settings.
    pub fn with_settings(self, settings: &AlertSettings) -> Result<Self, AlertError> {
        Ok(self
            .with_booking_lead_days(settings.booking_lead_days)?
            .with_upcoming_window_days(settings.upcoming_window_days))
    }

    pub fn trip_start(&self) -> NaiveDateTime {
        self.trip_start
    }

    pub fn trip_end(&self) -> NaiveDateTime {
        self.trip_end
    }

    pub fn upcoming_window_days(&self) -> i64 {
        self.upcoming_window_days
    }

    /// All alerts, ascending by timestamp.
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn get(&self, id: Uuid) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Insert an alert and restore timestamp order. Alerts sharing a
    /// timestamp keep their insertion order.
    pub fn add_alert(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        timestamp: NaiveDateTime,
        kind: AlertKind,
        priority: Priority,
    ) -> Uuid {
        let alert = Alert::new(title.into(), description.into(), timestamp, kind, priority);
        let id = alert.id;
        self.alerts.push(alert);
        self.alerts.sort_by_key(|a| a.timestamp);
        id
    }

    /// Remove an alert from the timeline.
    pub fn remove_alert(&mut self, id: Uuid) -> Option<Alert> {
        let index = self.alerts.iter().position(|a| a.id == id)?;
        Some(self.alerts.remove(index))
    }

    /// Mark an alert as acknowledged. Acknowledging twice is harmless.
    ///
    /// Returns `false` if no alert has this id.
    pub fn acknowledge_alert(&mut self, id: Uuid) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.acknowledged = true;
                true
            }
            None => false,
        }
    }

    /// Generate preparation, booking and activity alerts relative to the
    /// local current time.
    pub fn generate_trip_alerts(&mut self, schedule: &Schedule, booking_info: &BookingInfo) {
        self.generate_trip_alerts_at(schedule, booking_info, Local::now().naive_local());
    }

    /// Generate all trip alerts, treating `now` as the current time.
    pub fn generate_trip_alerts_at(
        &mut self,
        schedule: &Schedule,
        booking_info: &BookingInfo,
        now: NaiveDateTime,
    ) {
        let before = self.alerts.len();
        self.add_preparation_alerts();
        self.add_booking_deadline_alerts(booking_info, now);
        self.add_activity_alerts(schedule);
        info!(
            added = self.alerts.len() - before,
            total = self.alerts.len(),
            "trip alerts generated"
        );
    }

    fn add_preparation_alerts(&mut self) {
        for (days_before, title, description, priority) in PREPARATION_MILESTONES {
            let Some(due) = self.trip_start.checked_sub_signed(TimeDelta::days(days_before)) else {
                warn!(
                    title,
                    trip_start = %self.trip_start,
                    "milestone falls before representable time, skipping"
                );
                continue;
            };
            self.add_alert(title, description, due, AlertKind::Preparation, priority);
        }
    }

    /// Entries are visited in schedule order (first occurrence date, then
    /// block), with the name breaking any remaining tie, so alerts sharing a
    /// deadline follow the itinerary.
    ///
    /// Deadlines already passed are skipped silently; so are entries with no
    /// usable first occurrence.
    fn add_booking_deadline_alerts(&mut self, booking_info: &BookingInfo, now: NaiveDateTime) {
        let mut pending: Vec<(NaiveDateTime, TimeBlock, &str, &BookingEntry)> = booking_info
            .iter()
            .filter_map(|(name, entry)| {
                let (first, block) = first_occurrence(name, entry)?;
                Some((first, block, name.as_str(), entry))
            })
            .collect();
        pending.sort_by_key(|(first, block, _, _)| (*first, *block));

        for (first, _, name, entry) in pending {
            let Some(deadline) = first.checked_sub_signed(self.booking_lead) else {
                warn!(activity = %name, %first, "booking deadline not representable, skipping");
                continue;
            };
            if deadline <= now {
                debug!(activity = %name, %deadline, "booking deadline already passed");
                continue;
            }
            self.add_alert(
                format!("Book {name}"),
                format!(
                    "Time to book {name}! Price range: {}\nBooking link: {}",
                    entry.price_range, entry.booking_url
                ),
                deadline,
                AlertKind::BookingDeadline,
                Priority::High,
            );
        }
    }

    fn add_activity_alerts(&mut self, schedule: &Schedule) {
        for (date, block, activity) in scheduled_activities(schedule) {
            self.add_alert(
                format!("Upcoming: {}", activity.name),
                format!(
                    "Reminder: {} ({} hours)\nCategory: {}\nPrice range: {}",
                    activity.name, activity.duration_hours, activity.category, activity.price
                ),
                date.and_time(block.reminder_time()),
                AlertKind::Activity,
                Priority::Normal,
            );
        }
    }

    /// Unacknowledged alerts due within the configured window (7 days by
    /// default) of the local current time.
    pub fn upcoming_alerts(&self) -> Vec<&Alert> {
        self.upcoming_alerts_at(Local::now().naive_local())
    }

    /// [`upcoming_alerts`](Self::upcoming_alerts) with an explicit `now`.
    pub fn upcoming_alerts_at(&self, now: NaiveDateTime) -> Vec<&Alert> {
        self.upcoming_alerts_within(now, self.upcoming_window_days)
    }

    /// Unacknowledged alerts with `now <= timestamp <= now + window_days`,
    /// in timeline order. A window reaching past the representable range
    /// extends to its edge.
    pub fn upcoming_alerts_within(&self, now: NaiveDateTime, window_days: i64) -> Vec<&Alert> {
        let end = TimeDelta::try_days(window_days)
            .and_then(|window| now.checked_add_signed(window))
            .unwrap_or(if window_days < 0 {
                NaiveDateTime::MIN
            } else {
                NaiveDateTime::MAX
            });
        self.alerts
            .iter()
            .filter(|a| !a.acknowledged && a.timestamp >= now && a.timestamp <= end)
            .collect()
    }
}

/// Start and block of the first occurrence of a booking entry, if it can be
/// read.
fn first_occurrence(name: &str, entry: &BookingEntry) -> Option<(NaiveDateTime, TimeBlock)> {
    let Some(occurrence) = entry.occurrences.first() else {
        warn!(activity = %name, "booking entry has no occurrences, skipping");
        return None;
    };
    let raw = occurrence.date.trim();
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .or_else(|_| raw.parse::<NaiveDateTime>());
    match parsed {
        Ok(start) => Some((start, occurrence.timeblock)),
        Err(e) => {
            warn!(activity = %name, date = raw, error = %e, "unreadable occurrence date, skipping");
            None
        }
    }
}
