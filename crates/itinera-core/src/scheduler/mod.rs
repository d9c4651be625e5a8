//! Trip scheduler: greedy random assignment of activities to daily blocks.
//!
//! For each day in order and each block in [`TimeBlock::ALL`] order, the
//! scheduler picks one activity among those that fit the block, preferring
//! activities whose preferred time is exactly that block. Picked activities
//! are consumed, so no pool entry appears twice in a schedule. Once the pool
//! runs dry every remaining slot stays empty.
//!
//! This is a best-effort fill, not an optimal assignment.

pub mod random;
pub mod stats;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::model::{Activity, DaySchedule, Schedule, TimeBlock};

pub use random::{DefaultRandom, Random};
pub use stats::{TripStats, calculate_trip_stats};

/// Builds day-by-day schedules for one trip from a pool of activities.
pub struct TripScheduler {
    start_date: NaiveDate,
    end_date: NaiveDate,
    activities: Vec<Activity>,
    random: Box<dyn Random>,
}

impl TripScheduler {
    /// Scheduler with an OS-seeded random source.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self::with_random(start_date, end_date, Box::new(DefaultRandom::new()))
    }

    /// Scheduler drawing its choices from `random`.
    pub fn with_random(start_date: NaiveDate, end_date: NaiveDate, random: Box<dyn Random>) -> Self {
        Self {
            start_date,
            end_date,
            activities: Vec::new(),
            random,
        }
    }

    /// Scheduler seeded from `config.scheduler.seed` when one is set.
    pub fn from_config(start_date: NaiveDate, end_date: NaiveDate, config: &PlannerConfig) -> Self {
        let random = match config.scheduler.seed {
            Some(seed) => DefaultRandom::seeded(seed),
            None => DefaultRandom::new(),
        };
        Self::with_random(start_date, end_date, Box::new(random))
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Add an activity to the candidate pool. Duplicates are kept.
    pub fn add_activity(&mut self, activity: Activity) {
        self.activities.push(activity);
    }

    /// The candidate pool in insertion order.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Dates from start to end inclusive.
    pub fn trip_days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end_date;
        self.start_date.iter_days().take_while(move |day| *day <= end)
    }

    /// Assign activities to every day of the trip.
    ///
    /// Every trip date is present in the result. The candidate pool itself is
    /// left untouched, so calling this again produces a fresh schedule.
    pub fn generate_schedule(&mut self) -> Schedule {
        if self.end_date < self.start_date {
            warn!(
                start = %self.start_date,
                end = %self.end_date,
                "trip ends before it starts, schedule is empty"
            );
            return Schedule::new();
        }

        let mut available = self.activities.clone();
        let mut schedule = Schedule::new();

        for day in self.trip_days() {
            let mut day_schedule = DaySchedule::default();

            for block in TimeBlock::ALL {
                if available.is_empty() {
                    break;
                }
                match self.pick(&available, block) {
                    Some(index) => {
                        let activity = available.remove(index);
                        debug!(%day, %block, activity = %activity.name, "slot filled");
                        day_schedule.set(block, activity);
                    }
                    None => debug!(%day, %block, "no activity fits, slot left empty"),
                }
            }

            schedule.insert(day, day_schedule);
        }

        let placed: usize = schedule.values().map(DaySchedule::filled).sum();
        info!(
            days = schedule.len(),
            placed,
            unplaced = available.len(),
            "schedule generated"
        );
        schedule
    }

    /// Index into `available` of the activity chosen for `block`, if any fits.
    fn pick(&mut self, available: &[Activity], block: TimeBlock) -> Option<usize> {
        let fitting: Vec<usize> = available
            .iter()
            .enumerate()
            .filter(|(_, activity)| activity.fits(block))
            .map(|(index, _)| index)
            .collect();
        if fitting.is_empty() {
            return None;
        }

        let preferred: Vec<usize> = fitting
            .iter()
            .copied()
            .filter(|&index| available[index].preferred_time == Some(block))
            .collect();
        let candidates = if preferred.is_empty() { &fitting } else { &preferred };

        let pick = self.random.pick_index(candidates.len());
        match candidates.get(pick) {
            Some(&index) => Some(index),
            None => {
                warn!(
                    pick,
                    candidates = candidates.len(),
                    %block,
                    "random pick out of range, using first candidate"
                );
                candidates.first().copied()
            }
        }
    }
}

impl std::fmt::Debug for TripScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripScheduler")
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("activities", &self.activities.len())
            .finish_non_exhaustive()
    }
}
