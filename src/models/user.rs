use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub user_name: String,
    pub email: String,
    pub password: String, // Always hashed
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: Vec<ObjectId>,
    #[serde(default)]
    pub following: Vec<ObjectId>,
    #[serde(default)]
    pub post_count: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// What other users get to see. Never carries the password hash.
#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_name: String,
    pub email: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub followers: Vec<ObjectId>,
    pub following: Vec<ObjectId>,
    pub post_count: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn from_user(user: User, include_email: bool) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            user_name: user.user_name,
            email: include_email.then_some(user.email),
            profile_picture: user.profile_picture,
            bio: user.bio,
            followers: user.followers,
            following: user.following,
            post_count: user.post_count,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub user_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}
