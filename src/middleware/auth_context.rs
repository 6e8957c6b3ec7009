use std::future::{ready, Ready};

use actix_web::{dev::Payload, Error, FromRequest, HttpMessage, HttpRequest};
use mongodb::bson::oid::ObjectId;

use crate::error::ApiError;
use crate::middleware::auth::Claims;

/// The caller behind a verified bearer token.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<Claims>().and_then(|claims| {
            ObjectId::parse_str(&claims.user_id)
                .ok()
                .map(|user_id| AuthenticatedUser {
                    user_id,
                    email: claims.sub.clone(),
                })
        });

        ready(user.ok_or_else(|| ApiError::Unauthorized.into()))
    }
}
