use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;

use super::poi::Poi;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Walking,
    Driving,
    Transit,
    Bicycling,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Driving => "driving",
            TransportMode::Transit => "transit",
            TransportMode::Bicycling => "bicycling",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One travelled leg between consecutive activities, using the fastest allowed mode.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub distance: String,
    pub duration: String,
    pub mode: TransportMode,
    pub distance_meters: u64,
    pub duration_seconds: u64,
    /// Provider payload as received; the client draws the polyline from it.
    pub full_route: serde_json::Value,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayRoute {
    pub total_distance: String,
    pub total_duration: String,
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub segments: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub day_id: String,
    pub date: String,
    pub total_distance: String,
    pub total_duration: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripRoute {
    pub total_distance: String,
    pub total_duration: String,
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub days: Vec<DaySummary>,
}

#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub poi: Poi,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
    pub route_to_next: Option<RouteLeg>,
}

#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
    pub day_route: Option<DayRoute>,
}

#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub user_id: String,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub transport_modes: Vec<TransportMode>,
    pub complete_route: Option<TripRoute>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
