use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use trip_planner_api::{
    config::AppConfig,
    db::{
        itinerary_store::{ItineraryStore, MongoItineraryStore},
        mongo::create_mongo_client,
    },
    middleware::auth::JwtKeys,
    routes,
    services::{
        providers::{directions_from_config, Providers},
        route_aggregation_service::RouteAggregationService,
    },
};

fn startup_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(startup_error)?;
    log::info!("Starting trip planner API on {}:{}", config.host, config.port);

    let client = create_mongo_client(&config.mongodb_uri)
        .await
        .map_err(startup_error)?;

    let store: Arc<dyn ItineraryStore> =
        Arc::new(MongoItineraryStore::new(client.clone(), &config.database));
    let store = web::Data::from(store);

    let directions = directions_from_config(&config).map_err(startup_error)?;
    let aggregator = web::Data::new(RouteAggregationService::new(directions));
    let providers = web::Data::new(Providers::from_config(&config).map_err(startup_error)?);
    let keys = JwtKeys::new(config.jwt_secret.clone());

    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);
    let client = web::Data::new(client);
    let jwt = web::Data::new(keys.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(config.clone())
            .app_data(client.clone())
            .app_data(store.clone())
            .app_data(aggregator.clone())
            .app_data(providers.clone())
            .app_data(jwt.clone())
            .configure(|cfg| routes::configure(cfg, keys.clone()))
    })
    .bind(bind)?
    .run()
    .await
}
