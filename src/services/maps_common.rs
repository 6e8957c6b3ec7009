//! Types and request checks shared by the Google Maps and Mapbox clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::poi::{GeoPoint, Poi, PoiId};

pub const SEARCH_RADIUS_METERS: u32 = 50_000;
pub const MAPS_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum MapsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid maps URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Maps provider answered with status {0}")]
    Status(u16),
}

pub struct PoiCategory {
    pub id: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    /// `[lng, lat]`
    pub coordinates: [f64; 2],
    pub name: String,
    pub place_type: Vec<String>,
    pub full_name: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceFeature {
    pub name: String,
    pub place_type: Vec<String>,
    pub full_name: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ReverseGeocodeResult {
    pub name: String,
    pub features: Vec<PlaceFeature>,
}

#[derive(Debug, Serialize)]
pub struct PoiList {
    pub count: usize,
    pub pois: Vec<Poi>,
}

impl PoiList {
    pub fn new(pois: Vec<Poi>) -> Self {
        Self {
            count: pois.len(),
            pois,
        }
    }
}

/// Provider-neutral POI from one category search, before ids are assigned.
pub struct FoundPlace {
    pub name: String,
    pub description: String,
    pub location: GeoPoint,
}

/// Turn per-category results into POIs numbered sequentially across all categories.
pub fn number_pois<'a, I>(batches: I) -> Vec<Poi>
where
    I: IntoIterator<Item = (&'a PoiCategory, Vec<FoundPlace>)>,
{
    let mut pois = Vec::new();
    for (category, places) in batches {
        for place in places {
            pois.push(Poi {
                id: PoiId::Number(pois.len() as i64),
                name: format!("{} {}", category.emoji, place.name),
                description: place.description,
                category: Some(category.label.to_string()),
                image_url: Some(String::new()),
                location: place.location,
                address: None,
                external_id: None,
                source: None,
            });
        }
    }
    pois
}

#[derive(Debug, Deserialize, Default)]
pub struct CoordinatesRequest {
    pub longitude: Option<Value>,
    pub latitude: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search_text: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CityRequest {
    pub city: Option<Value>,
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

impl CoordinatesRequest {
    pub fn validate(&self) -> Result<GeoPoint, &'static str> {
        let lng = self.longitude.as_ref().and_then(as_number);
        let lat = self.latitude.as_ref().and_then(as_number);

        let (lng, lat) = match (lng, lat) {
            (Some(lng), Some(lat)) if lng.is_finite() && lat.is_finite() => (lng, lat),
            _ => return Err("Invalid coordinates"),
        };
        if !(-180.0..=180.0).contains(&lng) {
            return Err("Longitude out of range");
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err("Latitude out of range");
        }
        Ok(GeoPoint::new(lat, lng))
    }
}

/// Non-blank string, trimmed.
pub fn required_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
