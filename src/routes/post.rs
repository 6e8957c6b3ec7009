use actix_web::{web, HttpResponse};
use mongodb::{Client, Collection, Database};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::itinerary_store::ItineraryStore;
use crate::db::mongo::{POSTS, USERS};
use crate::error::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::post::{Post, PostRequest};
use crate::models::user::User;
use crate::services::post_service::{self, parse_id};

fn database(client: &Client, config: &AppConfig) -> Database {
    client.database(&config.database)
}

fn posts(db: &Database) -> Collection<Post> {
    db.collection(POSTS)
}

fn users(db: &Database) -> Collection<User> {
    db.collection(USERS)
}

fn post_id(raw: String) -> Result<mongodb::bson::oid::ObjectId, ApiError> {
    parse_id(&raw, "Invalid post id")
}

/*
    GET /api/posts
*/
pub async fn get_all(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let feed = post_service::list_posts(&posts(&database(&data, &config))).await?;
    Ok(HttpResponse::Ok().json(feed))
}

/*
    GET /api/posts/{id}
*/
pub async fn get_by_id(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = post_id(path.into_inner())?;
    let post = post_service::get_post(&posts(&database(&data, &config)), id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/*
    POST /api/posts
*/
pub async fn create(
    caller: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    store: web::Data<dyn ItineraryStore>,
    input: web::Json<PostRequest>,
) -> Result<HttpResponse, ApiError> {
    let db = database(&data, &config);
    let post = post_service::create_post(
        &posts(&db),
        &users(&db),
        store.get_ref(),
        caller.user_id,
        input.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(post))
}

/*
    PUT /api/posts/{id}
*/
pub async fn update(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<PostRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = post_id(path.into_inner())?;
    let post = post_service::update_post(
        &posts(&database(&data, &config)),
        caller.user_id,
        id,
        input.into_inner().description,
    )
    .await?;
    Ok(HttpResponse::Ok().json(post))
}

/*
    DELETE /api/posts/{id}
*/
pub async fn delete(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = post_id(path.into_inner())?;
    let db = database(&data, &config);
    post_service::delete_post(&posts(&db), &users(&db), caller.user_id, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/*
    POST /api/posts/{id}/like
*/
pub async fn like(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = post_id(path.into_inner())?;
    let post =
        post_service::toggle_like(&posts(&database(&data, &config)), caller.user_id, id).await?;
    Ok(HttpResponse::Ok().json(post))
}
