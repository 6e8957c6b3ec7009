use actix_web::{web, HttpResponse};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::db::itinerary_store::ItineraryStore;
use crate::error::ApiError;
use crate::services::itinerary_service::{build_itinerary, recompute_routes, ItineraryPayload};
use crate::services::route_aggregation_service::RouteAggregationService;

fn parse_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ApiError::bad_request("Invalid itinerary id"))
}

/*
    GET /api/itineraries/user/{user_id}
*/
pub async fn get_by_user(
    path: web::Path<String>,
    store: web::Data<dyn ItineraryStore>,
) -> Result<HttpResponse, ApiError> {
    let itineraries = store.find_by_user(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(itineraries))
}

/*
    GET /api/itineraries/{id}
*/
pub async fn get_by_id(
    path: web::Path<String>,
    store: web::Data<dyn ItineraryStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    match store.find_by_id(id).await? {
        Some(itinerary) => Ok(HttpResponse::Ok().json(itinerary)),
        None => Err(ApiError::NotFound("Itinerary not found")),
    }
}

/*
    POST /api/itineraries
*/
pub async fn create(
    store: web::Data<dyn ItineraryStore>,
    input: web::Json<ItineraryPayload>,
) -> Result<HttpResponse, ApiError> {
    let mut itinerary = build_itinerary(input.into_inner())?;
    itinerary.created_at = Some(Utc::now());

    let saved = store.insert(itinerary).await?;
    log::info!("Created itinerary {:?} for user {}", saved.id, saved.user_id);
    Ok(HttpResponse::Created().json(saved))
}

/*
    PUT /api/itineraries/{id}
*/
pub async fn update(
    path: web::Path<String>,
    store: web::Data<dyn ItineraryStore>,
    input: web::Json<ItineraryPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    let existing = store
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Itinerary not found"))?;

    let mut itinerary = build_itinerary(input.into_inner())?;
    itinerary.created_at = existing.created_at;
    itinerary.updated_at = Some(Utc::now());

    match store.replace(id, itinerary).await? {
        Some(updated) => Ok(HttpResponse::Ok().json(updated)),
        None => Err(ApiError::NotFound("Itinerary not found")),
    }
}

/*
    DELETE /api/itineraries/{id}
*/
pub async fn delete(
    path: web::Path<String>,
    store: web::Data<dyn ItineraryStore>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    if !store.delete(id).await? {
        return Err(ApiError::NotFound("Itinerary not found"));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Itinerary deleted" })))
}

/*
    POST /api/itineraries/{id}/routes
*/
pub async fn compute_routes(
    path: web::Path<String>,
    store: web::Data<dyn ItineraryStore>,
    aggregator: web::Data<RouteAggregationService>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path.into_inner())?;
    let itinerary = recompute_routes(store.get_ref(), aggregator.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(itinerary))
}
