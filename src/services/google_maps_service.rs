use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::maps_common::{
    number_pois, FoundPlace, GeocodeResult, MapsError, PlaceFeature, PoiCategory, PoiList,
    ReverseGeocodeResult, MAPS_TIMEOUT_SECS, SEARCH_RADIUS_METERS,
};
use crate::models::poi::GeoPoint;

const GEOCODE_PATH: &str = "/maps/api/geocode/json";
const NEARBY_PATH: &str = "/maps/api/place/nearbysearch/json";

pub static CATEGORIES: [PoiCategory; 6] = [
    PoiCategory { id: "restaurant", label: "Restaurants", emoji: "🍽️" },
    PoiCategory { id: "lodging", label: "Hotels", emoji: "🏨" },
    PoiCategory { id: "museum", label: "Museums", emoji: "🏛️" },
    PoiCategory { id: "tourist_attraction", label: "Attractions", emoji: "🎭" },
    PoiCategory { id: "park", label: "Parks", emoji: "🌳" },
    PoiCategory { id: "cafe", label: "Cafés", emoji: "☕" },
];

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeEntry {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct NearbyResponse {
    #[serde(default)]
    pub results: Vec<NearbyPlace>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyPlace {
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    pub geometry: Geometry,
}

impl GeocodeEntry {
    fn short_name(&self) -> Option<String> {
        self.address_components.first().map(|c| c.long_name.clone())
    }
}

pub fn to_geocode_result(response: GeocodeResponse) -> Option<GeocodeResult> {
    let entry = response.results.into_iter().next()?;
    Some(GeocodeResult {
        coordinates: [entry.geometry.location.lng, entry.geometry.location.lat],
        name: entry.short_name().unwrap_or_else(|| "Place".to_string()),
        place_type: entry.types,
        full_name: entry.formatted_address,
    })
}

pub fn to_reverse_result(response: GeocodeResponse) -> Option<ReverseGeocodeResult> {
    let name = response.results.first()?.short_name().unwrap_or_else(|| "Location".to_string());
    let features = response
        .results
        .into_iter()
        .map(|entry| PlaceFeature {
            name: entry.short_name().unwrap_or_default(),
            place_type: entry.types,
            full_name: entry.formatted_address,
        })
        .collect();
    Some(ReverseGeocodeResult { name, features })
}

pub fn to_found_places(response: NearbyResponse) -> Vec<FoundPlace> {
    response
        .results
        .into_iter()
        .map(|place| FoundPlace {
            name: place.name,
            description: place.vicinity.unwrap_or_default(),
            location: GeoPoint::new(place.geometry.location.lat, place.geometry.location.lng),
        })
        .collect()
}

pub struct GoogleMapsClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleMapsClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, MapsError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(MAPS_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http_client,
            api_key,
            base_url,
        })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url.trim_end_matches('/'), path))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, MapsError> {
        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MapsError::Status(response.status().as_u16()));
        }
        Ok(response.json::<T>().await?)
    }

    async fn geocode_raw(&self, address: &str) -> Result<GeocodeResponse, MapsError> {
        let url = self.url(GEOCODE_PATH, &[("address", address.to_string())])?;
        self.get(url).await
    }

    pub async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, MapsError> {
        Ok(to_geocode_result(self.geocode_raw(address).await?))
    }

    pub async fn reverse_geocode(
        &self,
        point: GeoPoint,
    ) -> Result<Option<ReverseGeocodeResult>, MapsError> {
        let url = self.url(GEOCODE_PATH, &[("latlng", point.to_query())])?;
        Ok(to_reverse_result(self.get(url).await?))
    }

    async fn nearby(
        &self,
        point: GeoPoint,
        category: &PoiCategory,
    ) -> Result<Vec<FoundPlace>, MapsError> {
        let url = self.url(
            NEARBY_PATH,
            &[
                ("location", point.to_query()),
                ("radius", SEARCH_RADIUS_METERS.to_string()),
                ("type", category.id.to_string()),
            ],
        )?;
        Ok(to_found_places(self.get(url).await?))
    }

    /// One nearby search per category, in order. A failing category contributes nothing.
    pub async fn pois_nearby(&self, point: GeoPoint) -> PoiList {
        let mut batches = Vec::with_capacity(CATEGORIES.len());
        for category in CATEGORIES.iter() {
            let places = match self.nearby(point, category).await {
                Ok(places) => places,
                Err(e) => {
                    log::warn!("Nearby search for {} failed: {}", category.id, e);
                    Vec::new()
                }
            };
            batches.push((category, places));
        }
        PoiList::new(number_pois(batches))
    }

    /// `None` when the city cannot be geocoded.
    pub async fn pois_by_city(&self, city: &str) -> Result<Option<PoiList>, MapsError> {
        let location = match self.geocode_raw(city).await?.results.into_iter().next() {
            Some(entry) => entry.geometry.location,
            None => return Ok(None),
        };
        Ok(Some(
            self.pois_nearby(GeoPoint::new(location.lat, location.lng)).await,
        ))
    }
}
