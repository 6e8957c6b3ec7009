//! Itinerary validation and the load → aggregate → save cycle behind route recomputation.

use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::itinerary_store::{ItineraryStore, StoreError};
use crate::models::itinerary::{
    Activity, Day, DayRoute, Itinerary, RouteLeg, TransportMode, TripRoute,
};
use crate::models::poi::{GeoPoint, Poi, PoiId};
use crate::services::route_aggregation_service::RouteAggregationService;

#[derive(Debug, Error, PartialEq)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn invalid(message: &str) -> ValidationError {
    ValidationError(message.to_string())
}

#[derive(Debug, Error)]
pub enum RouteComputationError {
    #[error("Itinerary not found")]
    NotFound,
    #[error("Itinerary has no transport modes")]
    NoTransportModes,
    #[error("Route aggregation failed: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PoiPayload {
    pub id: Option<PoiId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<LocationPayload>,
    pub address: Option<String>,
    pub external_id: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPayload {
    pub id: Option<String>,
    pub poi: Option<PoiPayload>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: Option<String>,
    pub route_to_next: Option<RouteLeg>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DayPayload {
    pub id: Option<String>,
    pub date: Option<String>,
    pub activities: Option<Vec<ActivityPayload>>,
    pub day_route: Option<DayRoute>,
}

/// Body of `POST /api/itineraries` and `PUT /api/itineraries/{id}`.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<String>,
    pub days: Option<Vec<DayPayload>>,
    pub is_public: Option<bool>,
    pub transport_modes: Option<Vec<TransportMode>>,
    pub complete_route: Option<TripRoute>,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn build_poi(payload: Option<PoiPayload>) -> Result<Poi, ValidationError> {
    let payload = payload.ok_or_else(|| invalid("Each activity must have a POI"))?;
    let name = non_blank(payload.name).ok_or_else(|| invalid("Each POI must have a name"))?;

    let location = payload
        .location
        .and_then(|loc| Some(GeoPoint::new(loc.lat?, loc.lng?)))
        .ok_or_else(|| invalid("Each POI must have a location"))?;
    if !location.is_valid() {
        return Err(invalid("POI coordinates out of range"));
    }

    Ok(Poi {
        id: payload.id.unwrap_or_else(|| PoiId::Text(new_id())),
        name,
        description: payload.description.unwrap_or_default(),
        category: payload.category,
        image_url: payload.image_url,
        location,
        address: payload.address,
        external_id: payload.external_id,
        source: payload.source,
    })
}

fn build_activity(payload: ActivityPayload) -> Result<Activity, ValidationError> {
    let start_time = non_blank(payload.start_time)
        .ok_or_else(|| invalid("Each activity must have a start time"))?;
    let end_time =
        non_blank(payload.end_time).ok_or_else(|| invalid("Each activity must have an end time"))?;
    let poi = build_poi(payload.poi)?;

    Ok(Activity {
        id: non_blank(payload.id).unwrap_or_else(new_id),
        poi,
        start_time,
        end_time,
        notes: payload.notes,
        route_to_next: payload.route_to_next,
    })
}

fn build_day(payload: DayPayload) -> Result<Day, ValidationError> {
    let date = non_blank(payload.date).ok_or_else(|| invalid("Each day must have a date"))?;
    let activities = payload
        .activities
        .unwrap_or_default()
        .into_iter()
        .map(build_activity)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Day {
        id: non_blank(payload.id).unwrap_or_else(new_id),
        date,
        activities,
        day_route: payload.day_route,
    })
}

/// Validate a client payload and turn it into an itinerary, stopping at the first problem.
/// Days and activities without an id get a fresh uuid.
pub fn build_itinerary(payload: ItineraryPayload) -> Result<Itinerary, ValidationError> {
    let name = non_blank(payload.name).ok_or_else(|| invalid("Name is required"))?;
    let user_id = non_blank(payload.user_id).ok_or_else(|| invalid("User id is required"))?;

    let start_raw =
        non_blank(payload.start_date).ok_or_else(|| invalid("Start date is required"))?;
    let end_raw = non_blank(payload.end_date).ok_or_else(|| invalid("End date is required"))?;
    let start = parse_date(&start_raw).ok_or_else(|| invalid("Invalid start date"))?;
    let end = parse_date(&end_raw).ok_or_else(|| invalid("Invalid end date"))?;
    if end < start {
        return Err(invalid("End date must be after start date"));
    }

    let days = payload
        .days
        .ok_or_else(|| invalid("Days are required"))?
        .into_iter()
        .map(build_day)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Itinerary {
        id: None,
        name: name.trim().to_string(),
        description: payload.description.unwrap_or_default(),
        destination: payload.destination.unwrap_or_default(),
        start_date: start_raw,
        end_date: end_raw,
        user_id,
        days,
        is_public: payload.is_public.unwrap_or(false),
        transport_modes: payload.transport_modes.unwrap_or_default(),
        complete_route: payload.complete_route,
        created_at: None,
        updated_at: None,
    })
}

/// Load the itinerary, recompute every leg with its own transport modes and save
/// `days` and `completeRoute` back in one write.
pub async fn recompute_routes(
    store: &dyn ItineraryStore,
    aggregator: &RouteAggregationService,
    id: ObjectId,
) -> Result<Itinerary, RouteComputationError> {
    let mut itinerary = store
        .find_by_id(id)
        .await?
        .ok_or(RouteComputationError::NotFound)?;

    if itinerary.transport_modes.is_empty() {
        return Err(RouteComputationError::NoTransportModes);
    }

    let result = aggregator.recompute(&mut itinerary).await;
    let unresolved = result.unresolved_legs();
    if !unresolved.is_empty() {
        log::info!(
            "Itinerary {} has {} legs without a route",
            id,
            unresolved.len()
        );
    }
    let complete_route = result.trip_route();

    store
        .save_routes(id, &itinerary.days, &complete_route)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => RouteComputationError::NotFound,
            other => RouteComputationError::Persistence(other),
        })?;

    itinerary.updated_at = Some(Utc::now());
    Ok(itinerary)
}
