#![allow(dead_code)]

use actix_web::{web, App};
use async_trait::async_trait;
use mongodb::{bson::oid::ObjectId, Client};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use trip_planner_api::{
    config::AppConfig,
    db::{
        itinerary_store::{ItineraryStore, StoreError},
        memory_store::MemoryItineraryStore,
    },
    middleware::auth::JwtKeys,
    models::{
        itinerary::{Day, Itinerary, TransportMode, TripRoute},
        poi::GeoPoint,
    },
    routes,
    services::{
        directions_service::{DirectionsError, DirectionsOutcome, DirectionsProvider, UsableRoute},
        google_maps_service::GoogleMapsClient,
        mapbox_service::MapboxClient,
        providers::Providers,
        route_aggregation_service::RouteAggregationService,
    },
};

pub const JWT_SECRET: &str = "integration-secret";

// Nothing listens here; provider calls fail fast with a connection error.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:9";
const UNREACHABLE_MONGO: &str =
    "mongodb://127.0.0.1:9/?serverSelectionTimeoutMS=200&connectTimeoutMS=200";

pub const PLAZA: (f64, f64) = (40.4154, -3.7074);
pub const PRADO: (f64, f64) = (40.4138, -3.6921);
pub const RETIRO: (f64, f64) = (40.4153, -3.6845);

type RouteKey = (u64, u64, TransportMode);

/// Directions double answering from a fixed table; anything else is `NoRoute`.
#[derive(Default)]
pub struct ScriptedDirections {
    routes: HashMap<RouteKey, (u64, u64)>,
    pub calls: Mutex<Vec<TransportMode>>,
}

impl ScriptedDirections {
    pub fn with_route(
        mut self,
        from: (f64, f64),
        to: (f64, f64),
        mode: TransportMode,
        meters: u64,
        seconds: u64,
    ) -> Self {
        self.routes
            .insert((from.0.to_bits(), to.0.to_bits(), mode), (meters, seconds));
        self
    }
}

#[async_trait]
impl DirectionsProvider for ScriptedDirections {
    async fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<DirectionsOutcome, DirectionsError> {
        self.calls.lock().unwrap().push(mode);
        let key = (origin.lat.to_bits(), destination.lat.to_bits(), mode);
        Ok(match self.routes.get(&key) {
            Some(&(meters, seconds)) => DirectionsOutcome::Usable(UsableRoute {
                distance_meters: meters,
                duration_seconds: seconds,
                display_distance: format!("{} m", meters),
                display_duration: format!("{} s", seconds),
                raw_payload: json!({ "routes": [{ "summary": mode.as_str() }] }),
            }),
            None => DirectionsOutcome::NoRoute,
        })
    }
}

/// Memory store whose route write-back always fails with a driver error.
#[derive(Default)]
pub struct FailingRouteWrites {
    inner: MemoryItineraryStore,
}

#[async_trait]
impl ItineraryStore for FailingRouteWrites {
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Itinerary>, StoreError> {
        self.inner.find_by_user(user_id).await
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Itinerary>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, itinerary: Itinerary) -> Result<Itinerary, StoreError> {
        self.inner.insert(itinerary).await
    }

    async fn replace(
        &self,
        id: ObjectId,
        itinerary: Itinerary,
    ) -> Result<Option<Itinerary>, StoreError> {
        self.inner.replace(id, itinerary).await
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError> {
        self.inner.delete(id).await
    }

    async fn save_routes(
        &self,
        _id: ObjectId,
        _days: &[Day],
        _complete_route: &TripRoute,
    ) -> Result<(), StoreError> {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "write refused");
        Err(StoreError::Database(mongodb::error::Error::from(refused)))
    }
}

pub struct TestApp {
    pub client: Arc<Client>,
    pub store: Arc<dyn ItineraryStore>,
    pub directions: Arc<ScriptedDirections>,
    pub providers: Arc<Providers>,
    pub config: AppConfig,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_directions(ScriptedDirections::default()).await
    }

    pub async fn with_directions(directions: ScriptedDirections) -> Self {
        let client = Client::with_uri_str(UNREACHABLE_MONGO)
            .await
            .expect("mongo client");
        let config = AppConfig::from_lookup(|name| match name {
            "MONGODB_URI" => Some(UNREACHABLE_MONGO.to_string()),
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("test config");

        Self {
            client: Arc::new(client),
            store: Arc::new(MemoryItineraryStore::new()),
            directions: Arc::new(directions),
            providers: Arc::new(Providers::default()),
            config,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ItineraryStore>) -> Self {
        self.store = store;
        self
    }

    /// Map providers pointed at a closed port, so requests that pass validation fail upstream.
    pub fn with_unreachable_maps(mut self) -> Self {
        self.providers = Arc::new(Providers {
            google_maps: Some(
                GoogleMapsClient::new("test-key".to_string(), DEAD_ENDPOINT.to_string())
                    .expect("google client"),
            ),
            mapbox: Some(
                MapboxClient::new("test-token".to_string(), DEAD_ENDPOINT.to_string())
                    .expect("mapbox client"),
            ),
            gemini: None,
        });
        self
    }

    pub fn token_for(&self, user_id: &str, email: &str) -> String {
        JwtKeys::new(JWT_SECRET)
            .issue(email, user_id)
            .expect("token")
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let store = self.store.clone();
        let directions: Arc<dyn DirectionsProvider> = self.directions.clone();
        let keys = JwtKeys::new(JWT_SECRET);

        App::new()
            .app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(self.client.clone()))
            .app_data(web::Data::from(store))
            .app_data(web::Data::new(RouteAggregationService::new(directions)))
            .app_data(web::Data::from(self.providers.clone()))
            .app_data(web::Data::new(keys.clone()))
            .configure(|cfg| routes::configure(cfg, keys))
    }

    pub fn calls(&self) -> usize {
        self.directions.calls.lock().unwrap().len()
    }
}

pub fn activity(id: &str, name: &str, at: (f64, f64)) -> Value {
    json!({
        "id": id,
        "poi": { "id": 1, "name": name, "location": { "lat": at.0, "lng": at.1 } },
        "startTime": "10:00",
        "endTime": "11:00"
    })
}

pub fn itinerary_body(modes: Value, activities: Vec<Value>) -> Value {
    json!({
        "name": "Madrid in a day",
        "destination": "Madrid",
        "startDate": "2025-06-01",
        "endDate": "2025-06-01",
        "userId": "user-1",
        "transportModes": modes,
        "days": [{ "id": "day-1", "date": "2025-06-01", "activities": activities }]
    })
}
