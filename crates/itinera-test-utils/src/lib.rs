//! Shared test utilities for itinera integration tests.
//!
//! Provides:
//! - [`init_tracing`]: one-time subscriber setup so `RUST_LOG` works in tests.
//! - [`ScriptedRandom`]: a [`Random`] that replays fixed choices.
//! - Canned suggestion text and sample activities.

use std::collections::VecDeque;
use std::sync::Once;

use chrono::{NaiveDate, NaiveDateTime};

use itinera_core::model::{Activity, PriceRange, TimeBlock};
use itinera_core::scheduler::Random;

static TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per test binary.
///
/// Honours `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Replays a fixed sequence of indices, then keeps returning `0`.
///
/// Panics if a scripted index is out of range for the candidate count, which
/// points straight at a test whose expectations drifted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    picks: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }

    /// Choices not consumed yet.
    pub fn remaining(&self) -> usize {
        self.picks.len()
    }
}

impl Random for ScriptedRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        let pick = self.picks.pop_front().unwrap_or(0);
        assert!(pick < len, "scripted pick {pick} out of range for {len} candidates");
        pick
    }
}

/// Calendar date shorthand.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid test date {year}-{month}-{day}"))
}

/// Date-time shorthand.
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    date(year, month, day)
        .and_hms_opt(hour, 0, 0)
        .unwrap_or_else(|| panic!("invalid test hour {hour}"))
}

/// Generated-text sample covering every parser rule: ranges, full-day
/// durations, single prices, keyword times, an ignored key and a record with
/// no usable duration.
pub const SAMPLE_SUGGESTIONS: &str = "\
Lisbon in June is warm and busy; book popular tours early.

Belem Tower Visit
- Duration: 1-2 hours
- Price: $10-15
- Category: Cultural
- Best time: early morning to avoid queues

Sintra Palaces
- Duration: Full day trip
- Price: $60-90
- Category: Cultural
- Best time: any day of the week

Alfama Food Tour
- Duration: 3 hours
- Price: $70
- Category: Culinary
- Best time: lunch
- Booking: required

Sunset Sail on the Tagus
- Duration: 2 hours
- Price: $45-60
- Category: Outdoor
- Best time: sunset

Fado Night
- Duration: 2-3 hours
- Price: $30-50
- Category: Music
- Time: dinner and evening show

Tile Museum
- Duration: a couple of hours
- Price: $8
- Category: Cultural
- Best time: afternoon
";

/// Names of the records in [`SAMPLE_SUGGESTIONS`] that convert cleanly.
///
/// The opening sentence contains no `:` and so is read as a name line; it
/// has no details and is rejected for a missing field, as is the tile museum
/// with its number-free duration.
pub const SAMPLE_CONVERTIBLE: [&str; 5] = [
    "Belem Tower Visit",
    "Sintra Palaces",
    "Alfama Food Tour",
    "Sunset Sail on the Tagus",
    "Fado Night",
];

/// A pool with one activity per block preference plus flexible ones.
pub fn sample_activities() -> Vec<Activity> {
    vec![
        Activity::new("Belem Tower", 1.5, "Cultural", PriceRange::new(10.0, 15.0))
            .preferred_time(TimeBlock::Morning),
        Activity::new("Food Tour", 3.0, "Culinary", PriceRange::fixed(70.0))
            .preferred_time(TimeBlock::Afternoon),
        Activity::new("Fado Night", 2.5, "Music", PriceRange::new(30.0, 50.0))
            .preferred_time(TimeBlock::Evening),
        Activity::new("Tram 28", 1.0, "Transport", PriceRange::fixed(3.0)),
        Activity::new("LX Factory", 2.0, "Shopping", PriceRange::new(0.0, 40.0)),
        Activity::new("Sintra Palaces", 8.0, "Cultural", PriceRange::new(60.0, 90.0)),
    ]
}
