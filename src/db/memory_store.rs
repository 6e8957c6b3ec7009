use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;

use super::itinerary_store::{ItineraryStore, StoreError};
use crate::models::itinerary::{Day, Itinerary, TripRoute};

/// In-memory itinerary storage for tests and running without a database.
#[derive(Default)]
pub struct MemoryItineraryStore {
    entries: tokio::sync::RwLock<HashMap<ObjectId, Itinerary>>,
}

impl MemoryItineraryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItineraryStore for MemoryItineraryStore {
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Itinerary>, StoreError> {
        let entries = self.entries.read().await;
        let mut found: Vec<Itinerary> = entries
            .values()
            .filter(|itinerary| itinerary.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Itinerary>, StoreError> {
        Ok(self.entries.read().await.get(&id).cloned())
    }

    async fn insert(&self, mut itinerary: Itinerary) -> Result<Itinerary, StoreError> {
        let id = ObjectId::new();
        itinerary.id = Some(id);
        self.entries.write().await.insert(id, itinerary.clone());
        Ok(itinerary)
    }

    async fn replace(
        &self,
        id: ObjectId,
        mut itinerary: Itinerary,
    ) -> Result<Option<Itinerary>, StoreError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(existing) => {
                itinerary.id = Some(id);
                *existing = itinerary.clone();
                Ok(Some(itinerary))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(&id).is_some())
    }

    async fn save_routes(
        &self,
        id: ObjectId,
        days: &[Day],
        complete_route: &TripRoute,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        let itinerary = entries.get_mut(&id).ok_or(StoreError::NotFound)?;
        itinerary.days = days.to_vec();
        itinerary.complete_route = Some(complete_route.clone());
        itinerary.updated_at = Some(Utc::now());
        Ok(())
    }
}
