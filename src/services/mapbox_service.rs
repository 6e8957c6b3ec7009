use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::maps_common::{
    number_pois, FoundPlace, GeocodeResult, MapsError, PlaceFeature, PoiCategory, PoiList,
    ReverseGeocodeResult, MAPS_TIMEOUT_SECS, SEARCH_RADIUS_METERS,
};
use crate::models::poi::GeoPoint;

const KM_PER_DEGREE: f64 = 111.0;
const CATEGORY_LIMIT: u32 = 10;
const CITY_TYPES: [&str; 3] = ["place", "locality", "region"];

pub static CATEGORIES: [PoiCategory; 6] = [
    PoiCategory { id: "restaurant", label: "Restaurants", emoji: "🍽️" },
    PoiCategory { id: "hotel", label: "Hotels", emoji: "🏨" },
    PoiCategory { id: "museum", label: "Museums", emoji: "🏛️" },
    PoiCategory { id: "attraction", label: "Attractions", emoji: "🎭" },
    PoiCategory { id: "park", label: "Parks", emoji: "🌳" },
    PoiCategory { id: "cafe", label: "Cafés", emoji: "☕" },
];

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub place_name: String,
    #[serde(default)]
    pub place_type: Vec<String>,
    /// `[lng, lat]`
    pub center: [f64; 2],
}

impl Feature {
    fn as_place_feature(&self) -> PlaceFeature {
        PlaceFeature {
            name: self.text.clone(),
            place_type: self.place_type.clone(),
            full_name: self.place_name.clone(),
        }
    }

    /// Place name with the POI's own name and the following comma removed.
    fn address(&self) -> String {
        let rest = self.place_name.replacen(&self.text, "", 1);
        match rest.strip_prefix(',') {
            Some(stripped) => stripped.trim_start().to_string(),
            None => rest,
        }
    }
}

/// Flat-earth distance, good enough to drop far-away forward-search hits.
pub fn approx_distance_km(from: GeoPoint, center: [f64; 2]) -> f64 {
    let dx = center[0] - from.lng;
    let dy = center[1] - from.lat;
    (dx * dx + dy * dy).sqrt() * KM_PER_DEGREE
}

pub fn to_geocode_result(collection: FeatureCollection) -> Option<GeocodeResult> {
    let feature = collection.features.into_iter().next()?;
    Some(GeocodeResult {
        coordinates: feature.center,
        name: feature.text,
        place_type: feature.place_type,
        full_name: feature.place_name,
    })
}

pub fn to_reverse_result(collection: FeatureCollection) -> Option<ReverseGeocodeResult> {
    if collection.features.is_empty() {
        return None;
    }
    let name = collection
        .features
        .iter()
        .find(|f| f.place_type.iter().any(|t| CITY_TYPES.contains(&t.as_str())))
        .map(|f| f.text.clone())
        .unwrap_or_else(|| "Current location".to_string());

    Some(ReverseGeocodeResult {
        name,
        features: collection.features.iter().map(Feature::as_place_feature).collect(),
    })
}

pub fn to_found_places(collection: FeatureCollection, origin: GeoPoint) -> Vec<FoundPlace> {
    let radius_km = SEARCH_RADIUS_METERS as f64 / 1000.0;
    collection
        .features
        .into_iter()
        .filter(|f| approx_distance_km(origin, f.center) <= radius_km)
        .map(|f| FoundPlace {
            description: f.address(),
            location: GeoPoint::new(f.center[1], f.center[0]),
            name: f.text,
        })
        .collect()
}

pub struct MapboxClient {
    http_client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl MapboxClient {
    pub fn new(access_token: String, base_url: String) -> Result<Self, MapsError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(MAPS_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http_client,
            access_token,
            base_url,
        })
    }

    /// `{base}/geocoding/v5/mapbox.places/{query}.json`, query percent-encoded as a path segment.
    fn places_url(&self, query: &str, params: &[(&str, String)]) -> Result<Url, MapsError> {
        let file = format!("{}.json", query);
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| MapsError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places", file.as_str()]);
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<FeatureCollection, MapsError> {
        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MapsError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    pub async fn geocode(&self, text: &str) -> Result<Option<GeocodeResult>, MapsError> {
        let url = self.places_url(text, &[("types", CITY_TYPES.join(","))])?;
        Ok(to_geocode_result(self.fetch(url).await?))
    }

    pub async fn reverse_geocode(
        &self,
        point: GeoPoint,
    ) -> Result<Option<ReverseGeocodeResult>, MapsError> {
        let url = self.places_url(&format!("{},{}", point.lng, point.lat), &[])?;
        Ok(to_reverse_result(self.fetch(url).await?))
    }

    async fn category_search(
        &self,
        point: GeoPoint,
        category: &PoiCategory,
    ) -> Result<Vec<FoundPlace>, MapsError> {
        let url = self.places_url(
            category.id,
            &[
                ("proximity", format!("{},{}", point.lng, point.lat)),
                ("limit", CATEGORY_LIMIT.to_string()),
            ],
        )?;
        Ok(to_found_places(self.fetch(url).await?, point))
    }

    pub async fn pois_nearby(&self, point: GeoPoint) -> PoiList {
        let mut batches = Vec::with_capacity(CATEGORIES.len());
        for category in CATEGORIES.iter() {
            let places = self
                .category_search(point, category)
                .await
                .unwrap_or_else(|e| {
                    log::warn!("Mapbox search for {} failed: {}", category.id, e);
                    Vec::new()
                });
            batches.push((category, places));
        }
        PoiList::new(number_pois(batches))
    }
}
