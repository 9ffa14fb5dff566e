use axum::{
    async_trait,
    extract::{Extension, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::Error,
    modules::user::repository::{self, User},
    types::Context,
};

async fn get_user_from_request(parts: &mut Parts) -> Result<User, Error> {
    let Extension(ctx) = parts
        .extract::<Extension<Arc<Context>>>()
        .await
        .map_err(|err| {
            tracing::error!("Application context missing from request: {}", err);
            Error::Internal(String::from("Application context missing"))
        })?;

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| Error::Unauthenticated(String::from("Invalid session token")))?;

    ctx.auth.authenticate(bearer.token()).await
}

fn forbidden() -> Response {
    Error::PermissionDenied(String::from("Forbidden")).into_response()
}

#[derive(Serialize, Clone)]
pub struct Auth {
    pub user: User,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        get_user_from_request(parts)
            .await
            .map(|user| Self { user })
            .map_err(IntoResponse::into_response)
    }
}

#[derive(Serialize, Clone)]
pub struct AdminAuth {
    pub user: User,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminAuth {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = get_user_from_request(parts)
            .await
            .map_err(IntoResponse::into_response)?;

        if !repository::is_admin(&user) {
            return Err(forbidden());
        }

        Ok(Self { user })
    }
}

#[derive(Serialize, Clone)]
pub struct OwnerAuth {
    pub user: User,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for OwnerAuth {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = get_user_from_request(parts)
            .await
            .map_err(IntoResponse::into_response)?;

        if !repository::is_owner(&user) {
            return Err(forbidden());
        }

        Ok(Self { user })
    }
}

#[derive(Serialize, Clone)]
pub struct AdminOrOwnerAuth {
    pub user: User,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminOrOwnerAuth {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = get_user_from_request(parts)
            .await
            .map_err(IntoResponse::into_response)?;

        if !(repository::is_admin(&user) || repository::is_owner(&user)) {
            return Err(forbidden());
        }

        Ok(Self { user })
    }
}
