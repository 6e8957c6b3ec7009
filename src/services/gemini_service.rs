//! Itinerary drafts from Gemini.
//!
//! The model is asked for structured JSON matching [`response_schema`]; the first candidate's
//! text is parsed into days and activities. Nothing is stored here, the client saves the draft
//! through the itinerary endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::models::itinerary::{Activity, Day, TransportMode};
use crate::models::poi::Poi;
use crate::services::itinerary_service::{parse_date, ValidationError};

const GENERATION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid Gemini URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Gemini answered with status {0}")]
    Status(u16),
    #[error("Unexpected Gemini response: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub transport_modes: Option<Vec<TransportMode>>,
    pub preferences: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripBrief {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub transport_modes: Vec<TransportMode>,
    pub preferences: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedItinerary {
    pub days: Vec<Day>,
    pub transport_modes: Vec<TransportMode>,
}

impl GenerateRequest {
    pub fn validate(self) -> Result<TripBrief, ValidationError> {
        let fail = |message: &str| ValidationError(message.to_string());

        let destination = self
            .destination
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| fail("Destination is required"))?;
        let start_date = self.start_date.unwrap_or_default();
        let end_date = self.end_date.unwrap_or_default();
        let start = parse_date(&start_date).ok_or_else(|| fail("Invalid start date"))?;
        let end = parse_date(&end_date).ok_or_else(|| fail("Invalid end date"))?;
        if end < start {
            return Err(fail("End date must be after start date"));
        }

        let transport_modes = self.transport_modes.unwrap_or_default();
        if transport_modes.is_empty() {
            return Err(fail("At least one transport mode is required"));
        }

        Ok(TripBrief {
            destination,
            start_date,
            end_date,
            transport_modes,
            preferences: self.preferences.unwrap_or_default(),
        })
    }
}

pub fn build_prompt(brief: &TripBrief) -> String {
    let modes = brief
        .transport_modes
        .iter()
        .map(TransportMode::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "I am travelling to {} between {} and {}.\n\
         I want to get around using these transport modes: {}.\n\
         Plan one entry per day with realistic opening hours and real coordinates for every place.\n\
         Take this additional information into account: \"{}\".",
        brief.destination, brief.start_date, brief.end_date, modes, brief.preferences
    )
}

pub fn response_schema() -> Value {
    let string = |description: &str| json!({ "type": "STRING", "description": description });
    let number = |description: &str| json!({ "type": "NUMBER", "description": description });

    json!({
        "type": "OBJECT",
        "properties": {
            "days": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": string("Unique day id"),
                        "date": string("Date as YYYY-MM-DD"),
                        "activities": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "id": string("Unique activity id"),
                                    "poi": {
                                        "type": "OBJECT",
                                        "properties": {
                                            "id": number("Numeric point of interest id"),
                                            "name": string("Place name with a fitting emoji"),
                                            "description": string("Address or short description"),
                                            "category": string("Restaurants, Museums, Attractions, Cafés, ..."),
                                            "imageUrl": string("Image URL, may be empty"),
                                            "location": {
                                                "type": "OBJECT",
                                                "properties": {
                                                    "lat": number("Latitude"),
                                                    "lng": number("Longitude")
                                                },
                                                "required": ["lat", "lng"]
                                            }
                                        },
                                        "required": ["id", "name", "description", "category", "imageUrl", "location"]
                                    },
                                    "startTime": string("Start time as HH:MM"),
                                    "endTime": string("End time as HH:MM"),
                                    "notes": string("Extra notes, may be empty")
                                },
                                "required": ["id", "poi", "startTime", "endTime", "notes"]
                            }
                        }
                    },
                    "required": ["id", "date", "activities"]
                }
            }
        },
        "required": ["days"]
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedPlan {
    #[serde(default)]
    days: Vec<GeneratedDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedDay {
    #[serde(default)]
    id: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    activities: Vec<GeneratedActivity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedActivity {
    #[serde(default)]
    id: String,
    poi: Poi,
    #[serde(default)]
    start_time: String,
    #[serde(default)]
    end_time: String,
    notes: Option<String>,
}

fn id_or_new(id: String) -> String {
    if id.trim().is_empty() {
        Uuid::new_v4().to_string()
    } else {
        id
    }
}

/// Pull the generated days out of a `generateContent` response.
pub fn parse_generated_days(payload: Value) -> Result<Vec<Day>, GenerationError> {
    let response: GenerateContentResponse = serde_json::from_value(payload)
        .map_err(|e| GenerationError::Malformed(e.to_string()))?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or_else(|| GenerationError::Malformed("no candidates".to_string()))?;

    let plan: GeneratedPlan =
        serde_json::from_str(&text).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    Ok(plan
        .days
        .into_iter()
        .map(|day| Day {
            id: id_or_new(day.id),
            date: day.date,
            activities: day
                .activities
                .into_iter()
                .map(|activity| Activity {
                    id: id_or_new(activity.id),
                    poi: activity.poi,
                    start_time: activity.start_time,
                    end_time: activity.end_time,
                    notes: activity.notes,
                    route_to_next: None,
                })
                .collect(),
            day_route: None,
        })
        .collect())
}

pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http_client,
            api_key,
            model,
            base_url,
        })
    }

    fn request_url(&self) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url.trim_end_matches('/'),
                self.model
            ),
            &[("key", &self.api_key)],
        )
    }

    pub async fn generate(&self, brief: TripBrief) -> Result<GeneratedItinerary, GenerationError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(&brief) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        });

        log::info!(
            "Generating itinerary for {} ({} to {})",
            brief.destination,
            brief.start_date,
            brief.end_date
        );

        let response = self
            .http_client
            .post(self.request_url()?)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GenerationError::Status(response.status().as_u16()));
        }

        let days = parse_generated_days(response.json().await?)?;
        log::debug!("Gemini returned {} days", days.len());

        Ok(GeneratedItinerary {
            days,
            transport_modes: brief.transport_modes,
        })
    }
}
