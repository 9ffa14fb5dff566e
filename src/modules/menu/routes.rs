use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use axum_typed_multipart::{FieldData, TryFromMultipart};
use serde::Deserialize;
use tempfile::NamedTempFile;
use validator::Validate;

use super::repository::{CreateMenuItemPayload, FindManyFilters, UpdateMenuItemPayload};
use crate::{
    error::{self, Error},
    modules::auth::middleware::AdminOrOwnerAuth,
    types::Context,
    utils::{
        extract::{Multipart, ValidatedJson},
        pagination::Pagination,
        response, storage,
        validation::parse_decimal,
    },
};

#[derive(Deserialize)]
struct MenuFilters {
    restaurant_id: Option<String>,
    category_id: Option<String>,
    available: Option<bool>,
}

#[derive(TryFromMultipart)]
struct CreateMenuItemForm {
    restaurant_id: String,
    category_id: Option<String>,
    name: String,
    description: Option<String>,
    price: String,
    is_available: Option<bool>,
    #[form_data(limit = "10MiB")]
    image: Option<FieldData<NamedTempFile>>,
}

#[derive(Deserialize, Validate)]
struct UpdateMenuItemBody {
    category_id: Option<String>,
    #[validate(length(min = 2, max = 128, code = "INVALID_NAME"))]
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    is_available: Option<bool>,
}

async fn get_menu_items(
    State(ctx): State<Arc<Context>>,
    pagination: Pagination,
    Query(filters): Query<MenuFilters>,
) -> error::Result<impl IntoResponse> {
    let menu_items = ctx
        .menu
        .list(
            pagination,
            FindManyFilters {
                restaurant_id: filters.restaurant_id,
                category_id: filters.category_id,
                is_available: filters.available,
            },
        )
        .await?;

    Ok(response::ok("Menu items fetched", menu_items))
}

async fn get_menu_item(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> error::Result<impl IntoResponse> {
    let menu_item = ctx.menu.get(&id).await?;
    Ok(response::ok("Menu item fetched", menu_item))
}

async fn create_menu_item(
    State(ctx): State<Arc<Context>>,
    auth: AdminOrOwnerAuth,
    form: Multipart<CreateMenuItemForm>,
) -> error::Result<impl IntoResponse> {
    let form = form.data;

    if form.name.trim().chars().count() < 2 {
        return Err(Error::InvalidArgument(String::from(
            "Name must be at least 2 characters",
        )));
    }

    let price = parse_decimal("price", &form.price)?;

    let image = match form.image {
        Some(image) => Some(storage::persist_image(&ctx.storage, "menu", image).await?),
        None => None,
    };

    let menu_item = ctx
        .menu
        .create(
            &auth.user,
            CreateMenuItemPayload {
                restaurant_id: form.restaurant_id,
                category_id: form.category_id.filter(|id| !id.is_empty()),
                name: form.name.trim().to_string(),
                description: form.description.unwrap_or_default(),
                price,
                image,
                is_available: form.is_available.unwrap_or(true),
            },
        )
        .await?;

    Ok(response::created("Menu item created", menu_item))
}

async fn update_menu_item(
    State(ctx): State<Arc<Context>>,
    auth: AdminOrOwnerAuth,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateMenuItemBody>,
) -> error::Result<impl IntoResponse> {
    let price = body
        .price
        .as_deref()
        .map(|raw| parse_decimal("price", raw))
        .transpose()?;

    let menu_item = ctx
        .menu
        .update(
            &auth.user,
            &id,
            UpdateMenuItemPayload {
                category_id: body.category_id,
                name: body.name,
                description: body.description,
                price,
                image: None,
                is_available: body.is_available,
            },
        )
        .await?;

    Ok(response::ok("Menu item updated", menu_item))
}

async fn delete_menu_item(
    State(ctx): State<Arc<Context>>,
    auth: AdminOrOwnerAuth,
    Path(id): Path<String>,
) -> error::Result<impl IntoResponse> {
    ctx.menu.delete(&auth.user, &id).await?;
    Ok(response::message("Menu item deleted"))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_menu_items).post(create_menu_item))
        .route(
            "/:id",
            get(get_menu_item)
                .put(update_menu_item)
                .delete(delete_menu_item),
        )
}
