//! Directions provider client.
//!
//! Answers "route from A to B by mode M" against the Google Directions API. Every call
//! goes straight to the provider: responses are not cached and failed calls are not
//! retried, the route aggregator decides what an unusable answer means.
//!
//! Provider payloads are classified once, here, into [`DirectionsOutcome`]: either a
//! usable route (first route, first leg, numeric distance and duration) or `NoRoute`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::models::{itinerary::TransportMode, poi::GeoPoint};

const DIRECTIONS_PATH: &str = "/maps/api/directions/json";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid directions URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Directions provider answered with status {0}")]
    Status(u16),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsableRoute {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub display_distance: String,
    pub display_duration: String,
    pub raw_payload: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectionsOutcome {
    Usable(UsableRoute),
    NoRoute,
}

#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<DirectionsOutcome, DirectionsError>;
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: Option<TextValue>,
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    #[serde(default)]
    text: String,
    value: f64, // meters or seconds
}

/// Decide whether a provider payload carries a route we can use.
pub fn classify(payload: Value) -> DirectionsOutcome {
    let parsed: DirectionsResponse = match serde_json::from_value(payload.clone()) {
        Ok(parsed) => parsed,
        Err(_) => return DirectionsOutcome::NoRoute,
    };

    if parsed.status != "OK" {
        return DirectionsOutcome::NoRoute;
    }

    let leg = match parsed.routes.first().and_then(|route| route.legs.first()) {
        Some(leg) => leg,
        None => return DirectionsOutcome::NoRoute,
    };

    match (&leg.distance, &leg.duration) {
        (Some(distance), Some(duration))
            if distance.value.is_finite()
                && duration.value.is_finite()
                && distance.value >= 0.0
                && duration.value >= 0.0 =>
        {
            DirectionsOutcome::Usable(UsableRoute {
                distance_meters: distance.value.round() as u64,
                duration_seconds: duration.value.round() as u64,
                display_distance: distance.text.clone(),
                display_duration: duration.text.clone(),
                raw_payload: payload,
            })
        }
        _ => DirectionsOutcome::NoRoute,
    }
}

pub struct GoogleDirectionsClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleDirectionsClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, DirectionsError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            base_url,
        })
    }

    fn request_url(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &format!("{}{}", self.base_url.trim_end_matches('/'), DIRECTIONS_PATH),
            &[
                ("origin", origin.to_query()),
                ("destination", destination.to_query()),
                ("mode", mode.as_str().to_string()),
                ("key", self.api_key.clone()),
            ],
        )
    }
}

#[async_trait]
impl DirectionsProvider for GoogleDirectionsClient {
    async fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<DirectionsOutcome, DirectionsError> {
        let url = self.request_url(origin, destination, mode)?;

        log::debug!(
            "Fetching {} directions for ({:.4}, {:.4}) to ({:.4}, {:.4})",
            mode,
            origin.lat,
            origin.lng,
            destination.lat,
            destination.lng
        );

        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(DirectionsError::Status(response.status().as_u16()));
        }

        let payload: Value = response.json().await?;
        Ok(classify(payload))
    }
}

/// Stand-in used when no Google Maps key is configured: every leg is unreachable.
pub struct UnconfiguredDirections;

#[async_trait]
impl DirectionsProvider for UnconfiguredDirections {
    async fn route(
        &self,
        _origin: GeoPoint,
        _destination: GeoPoint,
        _mode: TransportMode,
    ) -> Result<DirectionsOutcome, DirectionsError> {
        Ok(DirectionsOutcome::NoRoute)
    }
}
