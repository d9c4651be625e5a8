//! Shared data model: activities, daily time-blocks and schedules.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Time blocks
// ---------------------------------------------------------------------------

/// One of the three fixed daily windows activities are scheduled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBlock {
    Morning,
    Afternoon,
    Evening,
}

impl TimeBlock {
    /// All blocks in scheduling order.
    pub const ALL: [TimeBlock; 3] = [Self::Morning, Self::Afternoon, Self::Evening];

    /// Start and end hour of the block, end exclusive.
    pub const fn hours(self) -> (u32, u32) {
        match self {
            Self::Morning => (9, 12),
            Self::Afternoon => (13, 17),
            Self::Evening => (18, 22),
        }
    }

    /// Length of the block in hours.
    pub fn duration_hours(self) -> f64 {
        let (start, end) = self.hours();
        f64::from(end - start)
    }

    /// Time of day at which an activity in this block is announced.
    pub fn reminder_time(self) -> NaiveTime {
        let hour = match self {
            Self::Morning => 8,
            Self::Afternoon => 12,
            Self::Evening => 17,
        };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        };
        f.write_str(s)
    }
}

impl FromStr for TimeBlock {
    type Err = TimeBlockParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            other => Err(TimeBlockParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`TimeBlock`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid time block: {0:?}")]
pub struct TimeBlockParseError(pub String);

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// Inclusive price range in the trip's currency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range where min and max coincide.
    pub fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}-${}", self.min, self.max)
    }
}

/// A candidate activity for the trip.
///
/// Activities have no identity beyond their attributes. The scheduler treats
/// each value in its pool as a distinct token, so two activities with the
/// same name may both be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    /// Expected length in hours.
    pub duration_hours: f64,
    pub category: String,
    pub price: PriceRange,
    /// `None` means the activity can go in any block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_time: Option<TimeBlock>,
}

impl Activity {
    pub fn new(
        name: impl Into<String>,
        duration_hours: f64,
        category: impl Into<String>,
        price: PriceRange,
    ) -> Self {
        Self {
            name: name.into(),
            duration_hours,
            category: category.into(),
            price,
            preferred_time: None,
        }
    }

    /// Set the preferred time of day.
    pub fn preferred_time(mut self, block: TimeBlock) -> Self {
        self.preferred_time = Some(block);
        self
    }

    /// Whether this activity may occupy `block`: it must be short enough and
    /// either flexible or preferring exactly this block.
    pub fn fits(&self, block: TimeBlock) -> bool {
        if self.preferred_time.is_some_and(|preferred| preferred != block) {
            return false;
        }
        self.duration_hours <= block.duration_hours()
    }
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

/// The three slots of one trip day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DaySchedule {
    pub morning: Option<Activity>,
    pub afternoon: Option<Activity>,
    pub evening: Option<Activity>,
}

impl DaySchedule {
    pub fn slot(&self, block: TimeBlock) -> Option<&Activity> {
        match block {
            TimeBlock::Morning => self.morning.as_ref(),
            TimeBlock::Afternoon => self.afternoon.as_ref(),
            TimeBlock::Evening => self.evening.as_ref(),
        }
    }

    /// Place `activity` in `block`, returning whatever occupied it before.
    pub fn set(&mut self, block: TimeBlock, activity: Activity) -> Option<Activity> {
        let slot = match block {
            TimeBlock::Morning => &mut self.morning,
            TimeBlock::Afternoon => &mut self.afternoon,
            TimeBlock::Evening => &mut self.evening,
        };
        slot.replace(activity)
    }

    /// All slots in block order, filled or not.
    pub fn slots(&self) -> impl Iterator<Item = (TimeBlock, Option<&Activity>)> {
        TimeBlock::ALL.into_iter().map(|block| (block, self.slot(block)))
    }

    /// Only the filled slots, in block order.
    pub fn activities(&self) -> impl Iterator<Item = (TimeBlock, &Activity)> {
        self.slots()
            .filter_map(|(block, activity)| activity.map(|a| (block, a)))
    }

    pub fn filled(&self) -> usize {
        self.activities().count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled() == 0
    }
}

/// Day-indexed schedule. Keys serialise as ISO `YYYY-MM-DD` strings and
/// iterate chronologically.
pub type Schedule = BTreeMap<NaiveDate, DaySchedule>;

/// Iterate every filled slot of a schedule in date then block order.
pub fn scheduled_activities(
    schedule: &Schedule,
) -> impl Iterator<Item = (NaiveDate, TimeBlock, &Activity)> {
    schedule.iter().flat_map(|(date, day)| {
        day.activities()
            .map(move |(block, activity)| (*date, block, activity))
    })
}
