pub mod account_service;
pub mod directions_service;
pub mod gemini_service;
pub mod google_maps_service;
pub mod itinerary_service;
pub mod mapbox_service;
pub mod maps_common;
pub mod post_service;
pub mod providers;
pub mod route_aggregation_service;
