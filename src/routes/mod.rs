use actix_web::{error::JsonPayloadError, web, Error, HttpRequest};

use crate::error::ApiError;
use crate::middleware::auth::{AuthMiddleware, JwtKeys};

pub mod account;
pub mod ai;
pub mod health;
pub mod itinerary;
pub mod maps;
pub mod post;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    ApiError::bad_request(format!("Invalid request body: {}", err)).into()
}

/// Mounts every endpoint. Shared state (`AppConfig`, the Mongo client, the itinerary store,
/// the route aggregator, `Providers`, `JwtKeys`) is registered by the caller.
pub fn configure(cfg: &mut web::ServiceConfig, keys: JwtKeys) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .wrap(AuthMiddleware::new(keys.clone()))
                        .route("/register", web::post().to(account::register))
                        .route("/login", web::post().to(account::login))
                        .route("/me", web::get().to(account::me))
                        .route("/user/{user_name}", web::get().to(account::get_by_user_name))
                        .route("/users/{id}/follow", web::post().to(account::follow))
                        .route("/users/{id}/unfollow", web::post().to(account::unfollow)),
                )
                .service(
                    web::scope("/itineraries")
                        .route("/user/{user_id}", web::get().to(itinerary::get_by_user))
                        .route("", web::post().to(itinerary::create))
                        .route("/", web::post().to(itinerary::create))
                        .route("/{id}", web::get().to(itinerary::get_by_id))
                        .route("/{id}", web::put().to(itinerary::update))
                        .route("/{id}", web::delete().to(itinerary::delete))
                        .route("/{id}/routes", web::post().to(itinerary::compute_routes)),
                )
                .service(
                    web::scope("/posts")
                        .wrap(AuthMiddleware::new(keys))
                        .route("", web::get().to(post::get_all))
                        .route("/", web::get().to(post::get_all))
                        .route("", web::post().to(post::create))
                        .route("/", web::post().to(post::create))
                        .route("/{id}", web::get().to(post::get_by_id))
                        .route("/{id}", web::put().to(post::update))
                        .route("/{id}", web::delete().to(post::delete))
                        .route("/{id}/like", web::post().to(post::like)),
                )
                .service(
                    web::scope("/map")
                        .route("/geocode", web::post().to(maps::google_geocode))
                        .route("/reverse-geocode", web::post().to(maps::google_reverse_geocode))
                        .route("/pois-nearby", web::post().to(maps::google_pois_nearby))
                        .route("/pois-by-city", web::post().to(maps::google_pois_by_city)),
                )
                .service(
                    web::scope("/mapbox")
                        .route("/geocode", web::post().to(maps::mapbox_geocode))
                        .route("/reverse-geocode", web::post().to(maps::mapbox_reverse_geocode))
                        .route("/pois-nearby", web::post().to(maps::mapbox_pois_nearby)),
                )
                .service(
                    web::scope("/ai")
                        .route("/generate-itinerary", web::post().to(ai::generate_itinerary)),
                ),
        );
}
