use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `lat,lng`, the order every Google endpoint expects.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Providers hand out sequential numbers (nearby search) or their own string ids.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PoiId {
    Number(i64),
    Text(String),
}

#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub id: PoiId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub location: GeoPoint,
    pub address: Option<String>,
    pub external_id: Option<String>,
    pub source: Option<String>,
}
