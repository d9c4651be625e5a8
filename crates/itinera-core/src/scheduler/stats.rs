//! Aggregate statistics over a generated schedule.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{PriceRange, Schedule, scheduled_activities};

/// Totals across every filled slot. Empty slots contribute nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TripStats {
    pub total_activities: usize,
    /// Sum of minimum prices and sum of maximum prices.
    pub cost_range: PriceRange,
    pub activities_by_category: BTreeMap<String, usize>,
}

/// Count activities, total the price range and tally categories.
pub fn calculate_trip_stats(schedule: &Schedule) -> TripStats {
    let mut stats = TripStats::default();
    for (_, _, activity) in scheduled_activities(schedule) {
        stats.total_activities += 1;
        stats.cost_range.min += activity.price.min;
        stats.cost_range.max += activity.price.max;
        *stats
            .activities_by_category
            .entry(activity.category.clone())
            .or_insert(0) += 1;
    }
    stats
}
