//! Text-generation seams and the text → activities pipeline.
//!
//! The planner never runs a language model itself. Callers plug in a
//! [`TextGenerator`]; this module builds the prompts, passes generation
//! parameters through, and turns the returned text into [`Activity`]
//! records. No retries or timeouts happen here.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::booking::BookingUrlResolver;
use crate::model::Activity;
use crate::parser::{ActivityParseError, convert_llm_activity, parse_llm_response};

// ---------------------------------------------------------------------------
// Generator interface
// ---------------------------------------------------------------------------

/// Failure reported by an external text generator.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("text generation service error: {0}")]
    Service(String),

    #[error("text generation timed out")]
    Timeout,
}

/// Sampling parameters forwarded verbatim to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
}

impl GenerationParams {
    /// Long, fairly creative output for activity suggestions.
    pub const SUGGESTIONS: Self = Self {
        max_tokens: 2048,
        temperature: 0.7,
        top_p: 0.95,
        repeat_penalty: 1.2,
    };

    /// Short, focused output for a single booking link.
    pub const BOOKING_URL: Self = Self {
        max_tokens: 100,
        temperature: 0.3,
        top_p: 0.95,
        repeat_penalty: 1.1,
    };
}

/// An external text-generation service.
pub trait TextGenerator {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GenerationError>;
}

impl<G: TextGenerator + ?Sized> TextGenerator for &G {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GenerationError> {
        (**self).generate(prompt, params)
    }
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Traveller questionnaire answers. Field names follow the questionnaire's
/// JSON (camelCase).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripRequest {
    pub destination: String,
    /// Month of travel, e.g. `"2025-06"`.
    pub start_date: String,
    /// e.g. `"1 week"`.
    pub duration: String,
    pub group_size: String,
    pub budget: String,
    pub trip_purpose: Vec<String>,
    pub accommodation: String,
    pub interests: Vec<String>,
    pub transportation_preference: String,
    pub special_requirements: String,
}

/// Prompt asking for destination context and a list of activities in the
/// shape [`parse_llm_response`] understands.
pub fn build_suggestion_prompt(request: &TripRequest) -> String {
    let mut prompt = format!(
        "Based on a trip to {} in {} for {}:\n\n\
         1. Describe the destination during this season:\n\
         \x20  - Weather conditions and what to expect\n\
         \x20  - General pricing levels for the period (peak vs off-peak)\n\
         \x20  - Major events or festivals happening\n\
         \x20  - Tourist density and booking recommendations\n\n\
         2. The traveler is interested in {}, with a {} budget. Suggest specific activities.\n\
         \x20  Put each activity name on its own line, followed by:\n\
         \x20  - Duration: estimated time in hours or days\n\
         \x20  - Price: approximate price range in USD\n\
         \x20  - Category: e.g. Cultural, Outdoor, Culinary\n\
         \x20  - Best time: best time of day to do it\n\n\
         3. Organize the activities by category and indicate which ones best match the stated interests.\n",
        request.destination,
        request.start_date,
        request.duration,
        request.interests.join(", "),
        request.budget,
    );

    let extras = [
        ("Group", request.group_size.clone()),
        ("Trip purpose", request.trip_purpose.join(", ")),
        ("Accommodation", request.accommodation.clone()),
        ("Getting around", request.transportation_preference.clone()),
        ("Special requirements", request.special_requirements.clone()),
    ];
    let extras: Vec<String> = extras
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| format!("- {label}: {value}"))
        .collect();
    if !extras.is_empty() {
        prompt.push_str("\nTraveler details:\n");
        prompt.push_str(&extras.join("\n"));
        prompt.push('\n');
    }

    prompt.push_str(
        "\nPlease provide specific, practical suggestions that align with the traveler's interests and budget.",
    );
    prompt
}

/// Prompt asking for the single most reliable booking page for an activity.
pub fn build_booking_url_prompt(activity_name: &str, destination: &str) -> String {
    format!(
        "Give the URL of the webpage where I could most certainly buy tickets or make a \
         reservation for this activity: '{activity_name}' in {destination}.\n\n\
         Consider official websites, major booking platforms (like Viator, GetYourGuide, etc.), \
         or local tour operators.\n\
         Only return a single, most reliable URL. If you're not completely sure about the \
         specific URL, suggest the main booking platform's search page for this destination."
    )
}

/// Pull a booking link out of generated text: the first line when the text
/// mentions `http`, otherwise the whole trimmed text.
pub fn extract_booking_url(text: &str) -> String {
    let text = text.trim();
    if text.contains("http") {
        text.lines().next().unwrap_or_default().trim().to_owned()
    } else {
        text.to_owned()
    }
}

/// Adapts any [`TextGenerator`] into a [`BookingUrlResolver`].
pub struct GeneratorUrlResolver<G> {
    generator: G,
}

impl<G: TextGenerator> GeneratorUrlResolver<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

impl<G: TextGenerator> BookingUrlResolver for GeneratorUrlResolver<G> {
    fn booking_url(&self, activity_name: &str, destination: &str) -> Result<String, GenerationError> {
        let prompt = build_booking_url_prompt(activity_name, destination);
        let text = self.generator.generate(&prompt, &GenerationParams::BOOKING_URL)?;
        Ok(extract_booking_url(&text))
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Result of converting a block of generated text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityBatch {
    pub activities: Vec<Activity>,
    /// Records that could not be converted: name (if any) and reason.
    pub rejected: Vec<(Option<String>, ActivityParseError)>,
}

/// Parse and convert every record in `text`. A bad record is set aside and
/// never prevents the others from converting.
pub fn activities_from_text(text: &str) -> ActivityBatch {
    let mut batch = ActivityBatch::default();
    for record in parse_llm_response(text) {
        match convert_llm_activity(&record) {
            Ok(activity) => batch.activities.push(activity),
            Err(e) => {
                let name = record.get("name").cloned();
                warn!(name = name.as_deref().unwrap_or("<unnamed>"), error = %e, "skipping activity");
                batch.rejected.push((name, e));
            }
        }
    }
    info!(
        converted = batch.activities.len(),
        rejected = batch.rejected.len(),
        "activities parsed from text"
    );
    batch
}

/// Ask `generator` for suggestions and convert the answer.
pub fn suggest_activities(
    generator: &dyn TextGenerator,
    request: &TripRequest,
) -> Result<ActivityBatch, GenerationError> {
    let prompt = build_suggestion_prompt(request);
    let text = generator.generate(&prompt, &GenerationParams::SUGGESTIONS)?;
    Ok(activities_from_text(&text))
}
