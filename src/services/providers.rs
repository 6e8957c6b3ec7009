use std::sync::Arc;
use thiserror::Error;

use super::directions_service::{
    DirectionsError, DirectionsProvider, GoogleDirectionsClient, UnconfiguredDirections,
};
use super::gemini_service::{GeminiClient, GenerationError};
use super::google_maps_service::GoogleMapsClient;
use super::maps_common::MapsError;
use super::mapbox_service::MapboxClient;
use crate::config::AppConfig;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum ProviderSetupError {
    #[error(transparent)]
    Directions(#[from] DirectionsError),
    #[error(transparent)]
    Maps(#[from] MapsError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Third-party clients, each present only when its API key is configured.
#[derive(Default)]
pub struct Providers {
    pub google_maps: Option<GoogleMapsClient>,
    pub mapbox: Option<MapboxClient>,
    pub gemini: Option<GeminiClient>,
}

impl Providers {
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderSetupError> {
        let google_maps = match &config.google_maps_api_key {
            Some(key) => Some(GoogleMapsClient::new(
                key.clone(),
                config.google_maps_base_url.clone(),
            )?),
            None => None,
        };
        let mapbox = match &config.mapbox_api_key {
            Some(key) => Some(MapboxClient::new(key.clone(), config.mapbox_base_url.clone())?),
            None => None,
        };
        let gemini = match &config.gemini_api_key {
            Some(key) => Some(GeminiClient::new(
                key.clone(),
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
            )?),
            None => None,
        };

        Ok(Self {
            google_maps,
            mapbox,
            gemini,
        })
    }

    pub fn google_maps(&self) -> Result<&GoogleMapsClient, ApiError> {
        self.google_maps
            .as_ref()
            .ok_or(ApiError::ProviderNotConfigured("Google Maps"))
    }

    pub fn mapbox(&self) -> Result<&MapboxClient, ApiError> {
        self.mapbox
            .as_ref()
            .ok_or(ApiError::ProviderNotConfigured("Mapbox"))
    }

    pub fn gemini(&self) -> Result<&GeminiClient, ApiError> {
        self.gemini
            .as_ref()
            .ok_or(ApiError::ProviderNotConfigured("Gemini"))
    }
}

/// Google Directions when a key is configured, otherwise every leg comes back unroutable.
pub fn directions_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn DirectionsProvider>, ProviderSetupError> {
    match &config.google_maps_api_key {
        Some(key) => Ok(Arc::new(GoogleDirectionsClient::new(
            key.clone(),
            config.google_maps_base_url.clone(),
        )?)),
        None => {
            log::warn!("GOOGLE_MAPS_API_KEY not set, routes will not be computed");
            Ok(Arc::new(UnconfiguredDirections))
        }
    }
}
