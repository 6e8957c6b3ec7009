use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, ResponseError,
};
use chrono::{Duration, Utc};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::sync::Arc;

use crate::error::ApiError;

const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // email
    pub exp: usize,
    pub iat: usize,
    pub user_id: String,
}

/// HS256 signing secret shared by the token issuer and the middleware.
#[derive(Clone)]
pub struct JwtKeys {
    secret: Arc<String>,
}

impl JwtKeys {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::new(secret.into()),
        }
    }

    pub fn issue(&self, email: &str, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
            user_id: user_id.to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iat", "sub", "user_id"]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
    }
}

/// Decodes `Authorization: Bearer <token>` into [`Claims`] in the request extensions.
///
/// Requests without the header pass through untouched; handlers that need a caller take an
/// `AuthenticatedUser` and answer 401 themselves. A header carrying a bad token is rejected here.
pub struct AuthMiddleware {
    keys: JwtKeys,
}

impl AuthMiddleware {
    pub fn new(keys: JwtKeys) -> Self {
        Self { keys }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    keys: JwtKeys,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.strip_prefix("Bearer ").map(str::to_string));

        let accepted = match token {
            None => true,
            Some(Some(token)) => match self.keys.verify(&token) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    true
                }
                Err(err) => {
                    log::debug!("Rejected token: {}", err);
                    false
                }
            },
            Some(None) => false,
        };

        if !accepted {
            let response = req
                .into_response(ApiError::Unauthorized.error_response())
                .map_into_right_body();
            return Box::pin(ready(Ok(response)));
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move { service.call(req).await.map(|res| res.map_into_left_body()) })
    }
}
