use std::env;

use thiserror::Error;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 5001;
const DATABASE: &str = "TripPlanner";
const GEMINI_MODEL: &str = "gemini-2.0-flash";

pub const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com";
pub const MAPBOX_BASE_URL: &str = "https://api.mapbox.com";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Everything the service reads from the environment, resolved once at start-up.
/// Provider keys are handed to the clients that need them; nothing else calls `env::var`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database: String,
    pub jwt_secret: String,
    pub google_maps_api_key: Option<String>,
    pub google_maps_base_url: String,
    pub mapbox_api_key: Option<String>,
    pub mapbox_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset, same as a missing key in a .env file.
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|err| ConfigError::Invalid {
                name: "PORT",
                reason: err.to_string(),
            })?,
            None => PORT,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| HOST.to_string()),
            port,
            mongodb_uri: var("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
            database: var("MONGODB_DATABASE").unwrap_or_else(|| DATABASE.to_string()),
            jwt_secret: var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            google_maps_api_key: var("GOOGLE_MAPS_API_KEY"),
            google_maps_base_url: var("GOOGLE_MAPS_BASE_URL")
                .unwrap_or_else(|| GOOGLE_MAPS_BASE_URL.to_string()),
            mapbox_api_key: var("MAPBOX_API_KEY"),
            mapbox_base_url: var("MAPBOX_BASE_URL").unwrap_or_else(|| MAPBOX_BASE_URL.to_string()),
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| GEMINI_MODEL.to_string()),
            gemini_base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
        })
    }
}
