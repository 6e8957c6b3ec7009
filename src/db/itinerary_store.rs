use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client, Collection,
};
use std::sync::Arc;
use thiserror::Error;

use super::mongo::ITINERARIES;
use crate::models::itinerary::{Day, Itinerary, TripRoute};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("itinerary not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error("failed to encode itinerary: {0}")]
    Encoding(#[from] mongodb::bson::ser::Error),
}

/// Load and save itinerary documents. Writes are last-write-wins.
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Itinerary>, StoreError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Itinerary>, StoreError>;

    /// Stores a new itinerary and returns it with its assigned id.
    async fn insert(&self, itinerary: Itinerary) -> Result<Itinerary, StoreError>;

    /// Replaces the whole document. `None` when no itinerary has this id.
    async fn replace(
        &self,
        id: ObjectId,
        itinerary: Itinerary,
    ) -> Result<Option<Itinerary>, StoreError>;

    /// `false` when no itinerary has this id.
    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError>;

    /// Replaces `days` and `completeRoute` in a single update.
    async fn save_routes(
        &self,
        id: ObjectId,
        days: &[Day],
        complete_route: &TripRoute,
    ) -> Result<(), StoreError>;
}

pub struct MongoItineraryStore {
    collection: Collection<Itinerary>,
}

impl MongoItineraryStore {
    pub fn new(client: Arc<Client>, database: &str) -> Self {
        Self {
            collection: client.database(database).collection(ITINERARIES),
        }
    }
}

#[async_trait]
impl ItineraryStore for MongoItineraryStore {
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Itinerary>, StoreError> {
        let cursor = self
            .collection
            .find(doc! { "userId": user_id })
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Itinerary>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn insert(&self, mut itinerary: Itinerary) -> Result<Itinerary, StoreError> {
        itinerary.id = None;
        let result = self.collection.insert_one(&itinerary).await?;
        itinerary.id = result.inserted_id.as_object_id();
        Ok(itinerary)
    }

    async fn replace(
        &self,
        id: ObjectId,
        mut itinerary: Itinerary,
    ) -> Result<Option<Itinerary>, StoreError> {
        itinerary.id = Some(id);
        let result = self
            .collection
            .replace_one(doc! { "_id": id }, &itinerary)
            .await?;

        if result.matched_count == 0 {
            return Ok(None);
        }
        Ok(Some(itinerary))
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn save_routes(
        &self,
        id: ObjectId,
        days: &[Day],
        complete_route: &TripRoute,
    ) -> Result<(), StoreError> {
        let update = doc! {
            "$set": {
                "days": mongodb::bson::to_bson(days)?,
                "completeRoute": mongodb::bson::to_bson(complete_route)?,
                "updatedAt": mongodb::bson::to_bson(&Utc::now())?,
            }
        };

        let result = self.collection.update_one(doc! { "_id": id }, update).await?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
