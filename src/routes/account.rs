use actix_web::{web, HttpResponse};
use mongodb::{Client, Collection};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::mongo::USERS;
use crate::error::ApiError;
use crate::middleware::auth::JwtKeys;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::user::{LoginRequest, RegisterRequest, User, UserProfile};
use crate::services::account_service;
use crate::services::post_service::parse_id;

fn users(client: &Client, config: &AppConfig) -> Collection<User> {
    client.database(&config.database).collection(USERS)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileView {
    #[serde(flatten)]
    profile: UserProfile,
    is_following: bool,
}

/*
    POST /api/auth/register
*/
pub async fn register(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    keys: web::Data<JwtKeys>,
    input: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let registration = input.into_inner().validate()?;
    let response =
        account_service::register(&users(&data, &config), &keys, registration).await?;
    Ok(HttpResponse::Created().json(response))
}

/*
    POST /api/auth/login
*/
pub async fn login(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    keys: web::Data<JwtKeys>,
    input: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let credentials = input.into_inner().validate()?;
    let response = account_service::login(&users(&data, &config), &keys, credentials).await?;
    Ok(HttpResponse::Ok().json(response))
}

/*
    GET /api/auth/me
*/
pub async fn me(
    caller: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let user = account_service::find_user(&users(&data, &config), caller.user_id).await?;
    Ok(HttpResponse::Ok().json(UserProfile::from_user(user, true)))
}

/*
    GET /api/auth/user/{user_name}
*/
pub async fn get_by_user_name(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let user = account_service::find_by_user_name(&users(&data, &config), &path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    let is_following = user.followers.contains(&caller.user_id);
    let include_email = user.id == Some(caller.user_id);

    Ok(HttpResponse::Ok().json(ProfileView {
        profile: UserProfile::from_user(user, include_email),
        is_following,
    }))
}

async fn set_following(
    caller: AuthenticatedUser,
    raw_id: String,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    follow: bool,
) -> Result<HttpResponse, ApiError> {
    let target = parse_id(&raw_id, "Invalid user id")?;
    account_service::set_following(&users(&data, &config), caller.user_id, target, follow).await?;

    let message = if follow { "User followed" } else { "User unfollowed" };
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

/*
    POST /api/auth/users/{id}/follow
*/
pub async fn follow(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    set_following(caller, path.into_inner(), data, config, true).await
}

/*
    POST /api/auth/users/{id}/unfollow
*/
pub async fn unfollow(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    set_following(caller, path.into_inner(), data, config, false).await
}
