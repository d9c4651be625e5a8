//! Trip itinerary planning engine.
//!
//! ```text
//! generated text --parser--> Activity records --scheduler--> Schedule
//!                                                     |
//!                              +----------------------+-----------------+
//!                              v                      v                 v
//!                         TripStats            build_booking_info   TripAlertManager
//!                                                     |                 ^
//!                                                     +-----------------+
//!                                                                       |
//!                                                       itinera-store snapshots
//! ```

pub mod alerts;
pub mod booking;
pub mod config;
pub mod model;
pub mod parser;
pub mod scheduler;
pub mod suggest;

pub use alerts::{Alert, AlertError, AlertKind, AlertSnapshot, Priority, TripAlertManager};
pub use booking::{BookingEntry, BookingInfo, BookingUrlResolver, Occurrence, build_booking_info};
pub use config::PlannerConfig;
pub use model::{Activity, DaySchedule, PriceRange, Schedule, TimeBlock};
pub use parser::{ActivityParseError, RawActivity, convert_llm_activity, parse_llm_response};
pub use scheduler::{DefaultRandom, Random, TripScheduler, TripStats, calculate_trip_stats};
pub use suggest::{
    ActivityBatch, GenerationError, GenerationParams, GeneratorUrlResolver, TextGenerator,
    TripRequest, activities_from_text, suggest_activities,
};
