pub mod itinerary_store;
pub mod memory_store;
pub mod mongo;
