use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use validator::Validate;

use super::repository::{CreateCuisinePayload, UpdateCuisinePayload};
use crate::{
    error::{Error, Result},
    modules::{auth::middleware::AdminAuth, restaurant::repository::FindManyFilters},
    types::Context,
    utils::{extract::ValidatedJson, pagination::Pagination, response},
};

fn default_active() -> bool {
    true
}

#[derive(Deserialize, Validate)]
struct CreateCuisineBody {
    #[validate(length(min = 2, max = 64, code = "INVALID_NAME"))]
    name: String,
    #[serde(default)]
    description: String,
    image: Option<String>,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    is_popular: bool,
}

#[derive(Deserialize, Validate)]
struct UpdateCuisineBody {
    #[validate(length(min = 2, max = 64, code = "INVALID_NAME"))]
    name: Option<String>,
    description: Option<String>,
    image: Option<String>,
    is_active: Option<bool>,
    is_popular: Option<bool>,
}

async fn get_cuisines(State(ctx): State<Arc<Context>>) -> Result<impl IntoResponse> {
    let cuisines = ctx.repositories.cuisines.find_many().await?;
    Ok(response::ok("Cuisines fetched", cuisines))
}

async fn get_popular_cuisines(State(ctx): State<Arc<Context>>) -> Result<impl IntoResponse> {
    let cuisines = ctx.repositories.cuisines.find_popular().await?;
    Ok(response::ok("Popular cuisines fetched", cuisines))
}

async fn get_cuisine(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let cuisine = ctx
        .repositories
        .cuisines
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("Cuisine"))?;

    Ok(response::ok("Cuisine fetched", cuisine))
}

async fn get_cuisine_restaurants(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    if ctx.repositories.cuisines.find_by_id(&id).await?.is_none() {
        return Err(Error::not_found("Cuisine"));
    }

    let restaurants = ctx
        .restaurants
        .list(
            pagination,
            FindManyFilters {
                cuisine_id: Some(id),
                ..Default::default()
            },
        )
        .await?;

    Ok(response::ok("Restaurants fetched", restaurants))
}

async fn create_cuisine(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
    ValidatedJson(body): ValidatedJson<CreateCuisineBody>,
) -> Result<impl IntoResponse> {
    let cuisine = ctx
        .repositories
        .cuisines
        .create(CreateCuisinePayload {
            name: body.name,
            description: body.description,
            image: body.image,
            is_active: body.is_active,
            is_popular: body.is_popular,
        })
        .await?;

    Ok(response::created("Cuisine created", cuisine))
}

async fn update_cuisine(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateCuisineBody>,
) -> Result<impl IntoResponse> {
    let cuisine = ctx
        .repositories
        .cuisines
        .update_by_id(
            &id,
            UpdateCuisinePayload {
                name: body.name,
                description: body.description,
                image: body.image,
                is_active: body.is_active,
                is_popular: body.is_popular,
            },
        )
        .await?
        .ok_or_else(|| Error::not_found("Cuisine"))?;

    Ok(response::ok("Cuisine updated", cuisine))
}

async fn delete_cuisine(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    match ctx.repositories.cuisines.delete_by_id(&id).await? {
        true => Ok(response::message("Cuisine deleted")),
        false => Err(Error::not_found("Cuisine")),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_cuisines).post(create_cuisine))
        .route("/popular", get(get_popular_cuisines))
        .route(
            "/:id",
            get(get_cuisine).put(update_cuisine).delete(delete_cuisine),
        )
        .route("/:id/restaurants", get(get_cuisine_restaurants))
}
