use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection,
};
use regex::Regex;
use std::sync::OnceLock;

use crate::error::ApiError;
use crate::middleware::auth::JwtKeys;
use crate::models::user::{AuthResponse, AuthUser, LoginRequest, RegisterRequest, User};
use crate::services::itinerary_service::ValidationError;

const BCRYPT_COST: u32 = 10;
const MIN_PASSWORD_LEN: usize = 6;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
}

pub struct Registration {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

pub struct Credentials {
    pub email: String,
    pub password: String,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, ValidationError> {
        let (user_name, email, password) =
            match (present(self.user_name), present(self.email), present(self.password)) {
                (Some(u), Some(e), Some(p)) => (u.trim().to_string(), e.trim().to_lowercase(), p),
                _ => return Err(ValidationError("All fields are required".to_string())),
            };

        if !email_pattern().is_match(&email) {
            return Err(ValidationError("Invalid email address".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        Ok(Registration {
            user_name,
            email,
            password,
        })
    }
}

impl LoginRequest {
    pub fn validate(self) -> Result<Credentials, ValidationError> {
        match (present(self.email), present(self.password)) {
            (Some(email), Some(password)) => Ok(Credentials {
                email: email.trim().to_lowercase(),
                password,
            }),
            _ => Err(ValidationError("All fields are required".to_string())),
        }
    }
}

fn auth_response(keys: &JwtKeys, user: &User) -> Result<AuthResponse, ApiError> {
    let id = user
        .id
        .ok_or_else(|| ApiError::Internal("User without id".to_string()))?
        .to_hex();
    let token = keys
        .issue(&user.email, &id)
        .map_err(|e| ApiError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(AuthResponse {
        token,
        user: AuthUser {
            id,
            user_name: user.user_name.clone(),
            email: user.email.clone(),
        },
    })
}

pub async fn register(
    users: &Collection<User>,
    keys: &JwtKeys,
    registration: Registration,
) -> Result<AuthResponse, ApiError> {
    if users
        .find_one(doc! { "email": &registration.email })
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request("User already exists"));
    }

    let password = bcrypt::hash(&registration.password, BCRYPT_COST)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

    let now = Utc::now();
    let mut user = User {
        id: None,
        user_name: registration.user_name,
        email: registration.email,
        password,
        profile_picture: None,
        bio: None,
        followers: vec![],
        following: vec![],
        post_count: 0,
        created_at: Some(now),
        updated_at: Some(now),
    };

    let result = users.insert_one(&user).await?;
    user.id = result.inserted_id.as_object_id();
    log::info!("Registered user {}", user.user_name);

    auth_response(keys, &user)
}

pub async fn login(
    users: &Collection<User>,
    keys: &JwtKeys,
    credentials: Credentials,
) -> Result<AuthResponse, ApiError> {
    let user = match users.find_one(doc! { "email": &credentials.email }).await? {
        Some(user) => user,
        None => return Err(ApiError::InvalidCredentials),
    };

    if !bcrypt::verify(&credentials.password, &user.password).unwrap_or(false) {
        return Err(ApiError::InvalidCredentials);
    }

    auth_response(keys, &user)
}

pub async fn find_user(users: &Collection<User>, id: ObjectId) -> Result<User, ApiError> {
    users
        .find_one(doc! { "_id": id })
        .await?
        .ok_or(ApiError::NotFound("User not found"))
}

/// Adds or removes the follow edge on both users. `$addToSet` keeps follow idempotent.
pub async fn set_following(
    users: &Collection<User>,
    follower: ObjectId,
    target: ObjectId,
    follow: bool,
) -> Result<(), ApiError> {
    if follower == target {
        return Err(ApiError::bad_request("You cannot follow yourself"));
    }
    find_user(users, target).await?;

    let op = if follow { "$addToSet" } else { "$pull" };
    let now = mongodb::bson::to_bson(&Utc::now())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    users
        .update_one(
            doc! { "_id": follower },
            doc! { op: { "following": target }, "$set": { "updatedAt": now.clone() } },
        )
        .await?;
    users
        .update_one(
            doc! { "_id": target },
            doc! { op: { "followers": follower }, "$set": { "updatedAt": now } },
        )
        .await?;

    log::debug!(
        "{} {} {}",
        follower,
        if follow { "followed" } else { "unfollowed" },
        target
    );
    Ok(())
}

pub async fn find_by_user_name(
    users: &Collection<User>,
    user_name: &str,
) -> Result<Option<User>, ApiError> {
    Ok(users.find_one(doc! { "userName": user_name }).await?)
}
