use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::db::itinerary_store::StoreError;
use crate::services::gemini_service::GenerationError;
use crate::services::itinerary_service::{RouteComputationError, ValidationError};
use crate::services::maps_common::MapsError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Forbidden")]
    Forbidden,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0} API key not configured")]
    ProviderNotConfigured(&'static str),
    #[error("{0}")]
    Provider(String),
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.0)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Itinerary not found"),
            StoreError::Database(err) => ApiError::Database(err),
            StoreError::Encoding(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<RouteComputationError> for ApiError {
    fn from(err: RouteComputationError) -> Self {
        match err {
            RouteComputationError::NotFound => ApiError::NotFound("Itinerary not found"),
            RouteComputationError::NoTransportModes => {
                ApiError::bad_request("Itinerary has no transport modes")
            }
            RouteComputationError::Persistence(err) => {
                log::error!("Saving recomputed routes failed: {}", err);
                ApiError::Internal("Route aggregation failed".to_string())
            }
        }
    }
}

impl From<MapsError> for ApiError {
    fn from(err: MapsError) -> Self {
        log::error!("Maps provider request failed: {}", err);
        ApiError::Provider("Maps provider request failed".to_string())
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        log::error!("Itinerary generation failed: {}", err);
        ApiError::Provider("Error generating itinerary".to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
            ApiError::ProviderNotConfigured(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Driver errors can carry connection strings; keep them in the log only.
            ApiError::Database(err) => {
                log::error!("Database error: {}", err);
                "Database error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
