//! Free-text activity parser.
//!
//! Turns the loosely structured text produced by a suggestion generator into
//! [`RawActivity`] field maps, then converts each map into an [`Activity`].
//!
//! Expected input shape:
//!
//! ```text
//! Sunset Sail
//! - Duration: 2-3 hours
//! - Price: $45-60
//! - Category: Outdoor
//! - Best time: evening, around sunset
//! ```
//!
//! A line with no leading `-` and no `:` starts a new record. Lines starting
//! with `-` are `key: value` pairs; keys outside the synonym table are
//! dropped.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::model::{Activity, PriceRange, TimeBlock};

/// One record extracted from free text, keyed by normalised field name.
pub type RawActivity = BTreeMap<String, String>;

/// Hours assumed for anything described as taking a day.
pub const FULL_DAY_HOURS: f64 = 8.0;

/// Fields every record needs before it can become an [`Activity`].
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "duration", "price_range", "category", "best_time"];

const LIST_MARKER: char = '-';
const KEY_DELIMITER: char = ':';

const MORNING_KEYWORDS: [&str; 4] = ["morning", "sunrise", "early", "breakfast"];
const AFTERNOON_KEYWORDS: [&str; 4] = ["afternoon", "lunch", "noon", "midday"];
const EVENING_KEYWORDS: [&str; 4] = ["evening", "sunset", "night", "dinner"];

/// Errors from converting a single record. They never affect other records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActivityParseError {
    #[error("could not parse duration from {0:?}")]
    Duration(String),

    #[error("could not parse price range from {0:?}")]
    PriceRange(String),

    #[error("missing required field {0:?}")]
    MissingField(String),
}

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("decimal pattern is valid"))
}

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("integer pattern is valid"))
}

fn numbers(re: &Regex, text: &str) -> Vec<f64> {
    re.find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

/// Map a raw key onto the fixed field set.
fn normalize_key(key: &str) -> Option<&'static str> {
    match key {
        "duration" => Some("duration"),
        "price" => Some("price_range"),
        "category" => Some("category"),
        "best time" | "time" => Some("best_time"),
        _ => None,
    }
}

/// Split free text into one field map per activity.
///
/// The last record is emitted even without a trailing blank line. A record
/// whose detail lines appear before any name line is still emitted; it will
/// fail conversion with a missing `name`.
pub fn parse_llm_response(text: &str) -> Vec<RawActivity> {
    let mut records = Vec::new();
    let mut current = RawActivity::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(rest) = line.strip_prefix(LIST_MARKER) {
            let rest = rest.trim_start_matches([LIST_MARKER, ' ']);
            if let Some((key, value)) = rest.split_once(KEY_DELIMITER) {
                let key = key.trim().to_lowercase();
                if let Some(field) = normalize_key(&key) {
                    current.insert(field.to_owned(), value.trim().to_owned());
                }
            }
            continue;
        }

        if !line.contains(KEY_DELIMITER) {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            current.insert("name".to_owned(), line.to_owned());
        }
    }

    if !current.is_empty() {
        records.push(current);
    }
    records
}

/// Convert a duration description to hours.
///
/// Anything mentioning a day counts as [`FULL_DAY_HOURS`]; a range such as
/// `"2-3 hours"` yields its midpoint.
pub fn parse_duration(text: &str) -> Result<f64, ActivityParseError> {
    if text.to_lowercase().contains("day") {
        return Ok(FULL_DAY_HOURS);
    }

    let hours = match numbers(decimal_re(), text).as_slice() {
        [first, second, ..] => (first + second) / 2.0,
        [only] => *only,
        [] => return Err(ActivityParseError::Duration(text.to_owned())),
    };
    if hours <= 0.0 {
        return Err(ActivityParseError::Duration(text.to_owned()));
    }
    Ok(hours)
}

/// Extract a price range such as `"$30-40"` or `"$45"`.
///
/// Only integer digit runs are considered. A reversed pair is reordered so
/// that `min <= max`.
pub fn parse_price_range(text: &str) -> Result<PriceRange, ActivityParseError> {
    match numbers(integer_re(), text).as_slice() {
        [first, second, ..] => Ok(PriceRange::new(first.min(*second), first.max(*second))),
        [only] => Ok(PriceRange::fixed(*only)),
        [] => Err(ActivityParseError::PriceRange(text.to_owned())),
    }
}

/// Classify a free-text time hint. Morning keywords win over afternoon,
/// afternoon over evening; no match means flexible.
pub fn determine_preferred_time(text: &str) -> Option<TimeBlock> {
    let text = text.to_lowercase();
    let table: [(TimeBlock, &[&str]); 3] = [
        (TimeBlock::Morning, &MORNING_KEYWORDS),
        (TimeBlock::Afternoon, &AFTERNOON_KEYWORDS),
        (TimeBlock::Evening, &EVENING_KEYWORDS),
    ];
    table
        .into_iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(block, _)| block)
}

/// Build an [`Activity`] from a parsed record.
pub fn convert_llm_activity(record: &RawActivity) -> Result<Activity, ActivityParseError> {
    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !record.contains_key(**f)) {
        return Err(ActivityParseError::MissingField((*missing).to_owned()));
    }
    let field = |name: &str| record[name].as_str();

    Ok(Activity {
        name: field("name").to_owned(),
        duration_hours: parse_duration(field("duration"))?,
        category: field("category").to_owned(),
        price: parse_price_range(field("price_range"))?,
        preferred_time: determine_preferred_time(field("best_time")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ACTIVITIES: &str = "\
Sunset Sail
- Duration: 2-3 hours
- Price: $45-60
- Category: Outdoor
- Best time: evening, around sunset

Alfama Food Walk
- Duration: 3 hours
- Price: $70
- Category: Culinary
- Time: lunch
- Notes: book ahead";

    #[test]
    fn splits_records_on_name_lines() {
        let records = parse_llm_response(TWO_ACTIVITIES);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "Sunset Sail");
        assert_eq!(records[0]["duration"], "2-3 hours");
        assert_eq!(records[0]["price_range"], "$45-60");
        assert_eq!(records[0]["best_time"], "evening, around sunset");
        assert_eq!(records[1]["name"], "Alfama Food Walk");
        assert_eq!(records[1]["best_time"], "lunch");
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let records = parse_llm_response(TWO_ACTIVITIES);
        assert!(!records[1].contains_key("notes"));
        assert_eq!(records[1].len(), 5);
    }

    #[test]
    fn value_keeps_text_after_first_delimiter() {
        let records = parse_llm_response("Castle\n- Best time: opens 9:30 in the morning");
        assert_eq!(records[0]["best_time"], "opens 9:30 in the morning");
    }

    #[test]
    fn keys_are_case_insensitive() {
        let records = parse_llm_response("Castle\n- DURATION: 2 hours\n-   PRICE : $10");
        assert_eq!(records[0]["duration"], "2 hours");
        assert_eq!(records[0]["price_range"], "$10");
    }

    #[test]
    fn unmarked_lines_with_delimiter_are_ignored() {
        let records = parse_llm_response("Castle\nNote: closed Mondays\n- Duration: 2 hours");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "Castle");
        assert_eq!(records[0]["duration"], "2 hours");
    }

    #[test]
    fn empty_text_has_no_records() {
        assert!(parse_llm_response("").is_empty());
        assert!(parse_llm_response("\n   \n").is_empty());
    }

    #[test]
    fn details_before_any_name_form_a_nameless_record() {
        let records = parse_llm_response("- Duration: 2 hours\nCastle");
        assert_eq!(records.len(), 2);
        assert!(!records[0].contains_key("name"));
        assert_eq!(
            convert_llm_activity(&records[0]).unwrap_err(),
            ActivityParseError::MissingField("name".into())
        );
    }

    #[test]
    fn duration_examples() {
        assert_eq!(parse_duration("2-3 hours").unwrap(), 2.5);
        assert_eq!(parse_duration("Full day tour").unwrap(), 8.0);
        assert_eq!(parse_duration("Half-DAY").unwrap(), 8.0);
        assert_eq!(parse_duration("1.5 hours").unwrap(), 1.5);
        assert_eq!(parse_duration("1.5 to 2.5 hours").unwrap(), 2.0);
        assert_eq!(parse_duration("about 4h, maybe 5 or 6").unwrap(), 4.5);
    }

    #[test]
    fn duration_without_numbers_fails() {
        assert_eq!(
            parse_duration("a few hours").unwrap_err(),
            ActivityParseError::Duration("a few hours".into())
        );
        assert!(parse_duration("0 hours").is_err());
    }

    #[test]
    fn price_examples() {
        assert_eq!(parse_price_range("$30-40").unwrap(), PriceRange::new(30.0, 40.0));
        assert_eq!(parse_price_range("$30 - $40").unwrap(), PriceRange::new(30.0, 40.0));
        assert_eq!(parse_price_range("$45").unwrap(), PriceRange::new(45.0, 45.0));
        assert_eq!(parse_price_range("Free (0)").unwrap(), PriceRange::new(0.0, 0.0));
        assert_eq!(parse_price_range("$60-45").unwrap(), PriceRange::new(45.0, 60.0));
    }

    #[test]
    fn price_without_numbers_fails() {
        assert!(matches!(
            parse_price_range("varies"),
            Err(ActivityParseError::PriceRange(_))
        ));
    }

    #[test]
    fn only_ascii_digits_count() {
        // Arabic-Indic digits are not numbers here, and never swallow an
        // adjacent ASCII run.
        assert_eq!(parse_duration("\u{662}-3 hours").unwrap(), 3.0);
        assert_eq!(parse_duration("3\u{662} hours").unwrap(), 3.0);
        assert_eq!(parse_price_range("$1\u{662}-30").unwrap(), PriceRange::new(1.0, 30.0));
        assert!(matches!(
            parse_price_range("$\u{663}\u{660}"),
            Err(ActivityParseError::PriceRange(_))
        ));
    }

    #[test]
    fn preferred_time_keywords() {
        assert_eq!(determine_preferred_time("Best enjoyed at sunset"), Some(TimeBlock::Evening));
        assert_eq!(determine_preferred_time("EARLY start"), Some(TimeBlock::Morning));
        assert_eq!(determine_preferred_time("around midday"), Some(TimeBlock::Afternoon));
        assert_eq!(determine_preferred_time("anytime"), None);
    }

    #[test]
    fn morning_wins_over_later_blocks() {
        assert_eq!(
            determine_preferred_time("breakfast or dinner"),
            Some(TimeBlock::Morning)
        );
        assert_eq!(
            determine_preferred_time("lunch or late night"),
            Some(TimeBlock::Afternoon)
        );
    }

    #[test]
    fn converts_complete_record() {
        let records = parse_llm_response(TWO_ACTIVITIES);
        let sail = convert_llm_activity(&records[0]).unwrap();
        assert_eq!(sail.name, "Sunset Sail");
        assert_eq!(sail.duration_hours, 2.5);
        assert_eq!(sail.category, "Outdoor");
        assert_eq!(sail.price, PriceRange::new(45.0, 60.0));
        assert_eq!(sail.preferred_time, Some(TimeBlock::Evening));
    }

    #[test]
    fn conversion_reports_first_missing_field() {
        let mut record = RawActivity::new();
        record.insert("name".into(), "Castle".into());
        record.insert("duration".into(), "2 hours".into());
        assert_eq!(
            convert_llm_activity(&record).unwrap_err(),
            ActivityParseError::MissingField("price_range".into())
        );
    }

    #[test]
    fn conversion_propagates_parse_errors() {
        let records = parse_llm_response(
            "Castle\n- Duration: a while\n- Price: $5\n- Category: History\n- Time: any",
        );
        assert!(matches!(
            convert_llm_activity(&records[0]),
            Err(ActivityParseError::Duration(_))
        ));
    }
}
