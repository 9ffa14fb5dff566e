use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use validator::Validate;

use super::repository::{CreateCategoryPayload, UpdateCategoryPayload};
use crate::{
    error::{Error, Result},
    modules::auth::middleware::AdminAuth,
    types::Context,
    utils::{extract::ValidatedJson, response},
};

fn default_active() -> bool {
    true
}

#[derive(Deserialize, Validate)]
struct CreateCategoryBody {
    #[validate(length(min = 2, max = 64, code = "INVALID_NAME"))]
    name: String,
    #[serde(default)]
    #[validate(length(max = 500, code = "INVALID_DESCRIPTION"))]
    description: String,
    #[serde(default = "default_active")]
    is_active: bool,
}

#[derive(Deserialize, Validate)]
struct UpdateCategoryBody {
    #[validate(length(min = 2, max = 64, code = "INVALID_NAME"))]
    name: Option<String>,
    #[validate(length(max = 500, code = "INVALID_DESCRIPTION"))]
    description: Option<String>,
    is_active: Option<bool>,
}

async fn get_categories(State(ctx): State<Arc<Context>>) -> Result<impl IntoResponse> {
    let categories = ctx.repositories.categories.find_many().await?;
    Ok(response::ok("Categories fetched", categories))
}

async fn get_category(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let category = ctx
        .repositories
        .categories
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("Category"))?;

    Ok(response::ok("Category fetched", category))
}

async fn create_category(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
    ValidatedJson(body): ValidatedJson<CreateCategoryBody>,
) -> Result<impl IntoResponse> {
    let category = ctx
        .repositories
        .categories
        .create(CreateCategoryPayload {
            name: body.name,
            description: body.description,
            is_active: body.is_active,
        })
        .await?;

    Ok(response::created("Category created", category))
}

async fn update_category(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateCategoryBody>,
) -> Result<impl IntoResponse> {
    let category = ctx
        .repositories
        .categories
        .update_by_id(
            &id,
            UpdateCategoryPayload {
                name: body.name,
                description: body.description,
                is_active: body.is_active,
            },
        )
        .await?
        .ok_or_else(|| Error::not_found("Category"))?;

    Ok(response::ok("Category updated", category))
}

async fn delete_category(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    match ctx.repositories.categories.delete_by_id(&id).await? {
        true => Ok(response::message("Category deleted")),
        false => Err(Error::not_found("Category")),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_categories).post(create_category))
        .route(
            "/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}
