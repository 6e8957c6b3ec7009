use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::poi::GeoPoint;
use crate::services::maps_common::{required_text, CityRequest, CoordinatesRequest, SearchRequest};
use crate::services::providers::Providers;

fn coordinates(input: &CoordinatesRequest) -> Result<GeoPoint, ApiError> {
    input.validate().map_err(ApiError::bad_request)
}

fn search_text(input: &SearchRequest) -> Result<String, ApiError> {
    required_text(input.search_text.as_ref())
        .ok_or_else(|| ApiError::bad_request("Search text is required"))
}

/*
    POST /api/map/geocode
*/
pub async fn google_geocode(
    providers: web::Data<Providers>,
    input: web::Json<SearchRequest>,
) -> Result<HttpResponse, ApiError> {
    let client = providers.google_maps()?;
    let text = search_text(&input)?;

    match client.geocode(&text).await? {
        Some(result) => Ok(HttpResponse::Ok().json(result)),
        None => Err(ApiError::NotFound("No results found")),
    }
}

/*
    POST /api/map/reverse-geocode
*/
pub async fn google_reverse_geocode(
    providers: web::Data<Providers>,
    input: web::Json<CoordinatesRequest>,
) -> Result<HttpResponse, ApiError> {
    let client = providers.google_maps()?;
    let point = coordinates(&input)?;

    match client.reverse_geocode(point).await? {
        Some(result) => Ok(HttpResponse::Ok().json(result)),
        None => Err(ApiError::NotFound("No results found")),
    }
}

/*
    POST /api/map/pois-nearby
*/
pub async fn google_pois_nearby(
    providers: web::Data<Providers>,
    input: web::Json<CoordinatesRequest>,
) -> Result<HttpResponse, ApiError> {
    let client = providers.google_maps()?;
    let point = coordinates(&input)?;
    Ok(HttpResponse::Ok().json(client.pois_nearby(point).await))
}

/*
    POST /api/map/pois-by-city
*/
pub async fn google_pois_by_city(
    providers: web::Data<Providers>,
    input: web::Json<CityRequest>,
) -> Result<HttpResponse, ApiError> {
    let client = providers.google_maps()?;
    let city = required_text(input.city.as_ref())
        .ok_or_else(|| ApiError::bad_request("City is required"))?;

    match client.pois_by_city(&city).await? {
        Some(pois) => Ok(HttpResponse::Ok().json(pois)),
        None => Err(ApiError::NotFound("City not found")),
    }
}

/*
    POST /api/mapbox/geocode
*/
pub async fn mapbox_geocode(
    providers: web::Data<Providers>,
    input: web::Json<SearchRequest>,
) -> Result<HttpResponse, ApiError> {
    let client = providers.mapbox()?;
    let text = search_text(&input)?;

    match client.geocode(&text).await? {
        Some(result) => Ok(HttpResponse::Ok().json(result)),
        None => Err(ApiError::NotFound("No results found")),
    }
}

/*
    POST /api/mapbox/reverse-geocode
*/
pub async fn mapbox_reverse_geocode(
    providers: web::Data<Providers>,
    input: web::Json<CoordinatesRequest>,
) -> Result<HttpResponse, ApiError> {
    let client = providers.mapbox()?;
    let point = coordinates(&input)?;

    match client.reverse_geocode(point).await? {
        Some(result) => Ok(HttpResponse::Ok().json(result)),
        None => Err(ApiError::NotFound("No results found")),
    }
}

/*
    POST /api/mapbox/pois-nearby
*/
pub async fn mapbox_pois_nearby(
    providers: web::Data<Providers>,
    input: web::Json<CoordinatesRequest>,
) -> Result<HttpResponse, ApiError> {
    let client = providers.mapbox()?;
    let point = coordinates(&input)?;
    Ok(HttpResponse::Ok().json(client.pois_nearby(point).await))
}
