use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::itinerary::{Day, TripRoute};

#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub itinerary: ObjectId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Adds `user_id` to the likes when absent, removes it otherwise.
    /// Returns whether the post is liked by `user_id` afterwards.
    pub fn toggle_like(&mut self, user_id: ObjectId) -> bool {
        match self.likes.iter().position(|id| *id == user_id) {
            Some(index) => {
                self.likes.remove(index);
                false
            }
            None => {
                self.likes.push(user_id);
                true
            }
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub itinerary_id: Option<String>,
    pub description: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_name: String,
    pub profile_picture: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PostItinerary {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub days: Vec<Day>,
    pub complete_route: Option<TripRoute>,
}

/// A post with its author and itinerary resolved, as the feed shows it.
#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedPost {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user: Option<PostAuthor>,
    pub itinerary: Option<PostItinerary>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    pub created_at: Option<DateTime<Utc>>,
}
