use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Collection,
};

use crate::db::itinerary_store::ItineraryStore;
use crate::db::mongo::{ITINERARIES, USERS};
use crate::error::ApiError;
use crate::models::post::{PopulatedPost, Post, PostRequest};
use crate::models::user::User;

/// Resolves `user` and `itinerary` references in place; dangling references become null.
fn populate_stages() -> Vec<Document> {
    vec![
        doc! { "$lookup": {
            "from": USERS,
            "localField": "user",
            "foreignField": "_id",
            "as": "user",
        }},
        doc! { "$unwind": { "path": "$user", "preserveNullAndEmptyArrays": true } },
        doc! { "$lookup": {
            "from": ITINERARIES,
            "localField": "itinerary",
            "foreignField": "_id",
            "as": "itinerary",
        }},
        doc! { "$unwind": { "path": "$itinerary", "preserveNullAndEmptyArrays": true } },
    ]
}

fn decode(document: Document) -> Result<PopulatedPost, ApiError> {
    mongodb::bson::from_document(document)
        .map_err(|e| ApiError::Internal(format!("Malformed post: {}", e)))
}

pub fn parse_id(raw: &str, message: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(message))
}

pub async fn list_posts(posts: &Collection<Post>) -> Result<Vec<PopulatedPost>, ApiError> {
    let mut pipeline = vec![doc! { "$sort": { "createdAt": -1 } }];
    pipeline.extend(populate_stages());

    let documents: Vec<Document> = posts.aggregate(pipeline).await?.try_collect().await?;
    documents.into_iter().map(decode).collect()
}

pub async fn get_post(posts: &Collection<Post>, id: ObjectId) -> Result<PopulatedPost, ApiError> {
    let mut pipeline = vec![doc! { "$match": { "_id": id } }];
    pipeline.extend(populate_stages());

    match posts.aggregate(pipeline).await?.try_next().await? {
        Some(document) => decode(document),
        None => Err(ApiError::NotFound("Post not found")),
    }
}

async fn find_post(posts: &Collection<Post>, id: ObjectId) -> Result<Post, ApiError> {
    posts
        .find_one(doc! { "_id": id })
        .await?
        .ok_or(ApiError::NotFound("Post not found"))
}

async fn find_own_post(
    posts: &Collection<Post>,
    id: ObjectId,
    author: ObjectId,
) -> Result<Post, ApiError> {
    let post = find_post(posts, id).await?;
    if post.user != author {
        return Err(ApiError::Forbidden);
    }
    Ok(post)
}

fn clean_description(description: Option<String>) -> String {
    description.map(|d| d.trim().to_string()).unwrap_or_default()
}

pub async fn create_post(
    posts: &Collection<Post>,
    users: &Collection<User>,
    itineraries: &dyn ItineraryStore,
    author: ObjectId,
    request: PostRequest,
) -> Result<Post, ApiError> {
    let raw_id = request
        .itinerary_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Itinerary id is required"))?;
    let itinerary_id = parse_id(&raw_id, "Invalid itinerary id")?;

    if itineraries.find_by_id(itinerary_id).await?.is_none() {
        return Err(ApiError::NotFound("Itinerary not found"));
    }

    let mut post = Post {
        id: None,
        user: author,
        itinerary: itinerary_id,
        description: clean_description(request.description),
        likes: vec![],
        created_at: Some(Utc::now()),
    };

    let result = posts.insert_one(&post).await?;
    post.id = result.inserted_id.as_object_id();

    users
        .update_one(doc! { "_id": author }, doc! { "$inc": { "postCount": 1 } })
        .await?;

    Ok(post)
}

pub async fn update_post(
    posts: &Collection<Post>,
    author: ObjectId,
    id: ObjectId,
    description: Option<String>,
) -> Result<Post, ApiError> {
    let mut post = find_own_post(posts, id, author).await?;
    post.description = clean_description(description);

    posts
        .update_one(
            doc! { "_id": id },
            doc! { "$set": { "description": post.description.clone() } },
        )
        .await?;
    Ok(post)
}

pub async fn delete_post(
    posts: &Collection<Post>,
    users: &Collection<User>,
    author: ObjectId,
    id: ObjectId,
) -> Result<(), ApiError> {
    find_own_post(posts, id, author).await?;

    posts.delete_one(doc! { "_id": id }).await?;
    users
        .update_one(doc! { "_id": author }, doc! { "$inc": { "postCount": -1 } })
        .await?;
    Ok(())
}

pub async fn toggle_like(
    posts: &Collection<Post>,
    user: ObjectId,
    id: ObjectId,
) -> Result<Post, ApiError> {
    let mut post = find_post(posts, id).await?;
    let liked = post.toggle_like(user);

    let update = if liked {
        doc! { "$addToSet": { "likes": user } }
    } else {
        doc! { "$pull": { "likes": user } }
    };
    posts.update_one(doc! { "_id": id }, update).await?;

    Ok(post)
}
