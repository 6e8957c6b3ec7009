pub mod itinerary;
pub mod poi;
pub mod post;
pub mod user;
