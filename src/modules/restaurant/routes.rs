use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use axum_typed_multipart::{FieldData, TryFromMultipart};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use tempfile::NamedTempFile;
use validator::Validate;

use super::{
    repository::{CreateRestaurantPayload, FindManyFilters, UpdateRestaurantPayload},
    service::WorkingHourInput,
};
use crate::{
    error::{self, Error},
    modules::{
        auth::middleware::{AdminAuth, AdminOrOwnerAuth},
        menu::repository::FindManyFilters as MenuFilters,
    },
    types::Context,
    utils::{
        extract::{Multipart, ValidatedJson},
        pagination::Pagination,
        response, storage,
        validation::parse_decimal,
    },
};

#[derive(Deserialize)]
struct RestaurantFilters {
    cuisine_id: Option<String>,
    min_rating: Option<String>,
    search: Option<String>,
}

#[derive(TryFromMultipart)]
struct CreateRestaurantForm {
    name: String,
    description: Option<String>,
    address: String,
    phone: String,
    email: String,
    delivery_fee: Option<String>,
    /// JSON array of cuisine ids.
    cuisine_ids: Option<String>,
    #[form_data(limit = "10MiB")]
    image: Option<FieldData<NamedTempFile>>,
}

#[derive(Deserialize, Validate)]
struct UpdateRestaurantBody {
    #[validate(length(min = 2, max = 128, code = "INVALID_NAME"))]
    name: Option<String>,
    description: Option<String>,
    #[validate(length(min = 5, max = 255, code = "INVALID_ADDRESS"))]
    address: Option<String>,
    #[validate(length(min = 7, max = 20, code = "INVALID_PHONE"))]
    phone: Option<String>,
    #[validate(email(code = "INVALID_EMAIL"))]
    email: Option<String>,
    delivery_fee: Option<String>,
    is_active: Option<bool>,
    cuisine_ids: Option<Vec<String>>,
}

#[derive(Deserialize, Validate)]
struct WorkingHoursBody {
    #[validate(length(max = 7, code = "TOO_MANY_DAYS"))]
    working_hours: Vec<WorkingHourInput>,
}

#[derive(Deserialize, Validate)]
struct AssignOwnerBody {
    #[validate(email(code = "INVALID_EMAIL", message = "Invalid email address"))]
    email: String,
}

fn parse_delivery_fee(raw: Option<&str>) -> error::Result<Option<BigDecimal>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let fee = parse_decimal("delivery_fee", raw)?;
    if fee < BigDecimal::from(0) {
        return Err(Error::InvalidArgument(String::from(
            "delivery_fee cannot be negative",
        )));
    }

    Ok(Some(fee))
}

fn parse_cuisine_ids(raw: Option<&str>) -> error::Result<Vec<String>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(vec![]),
        Some(raw) => serde_json::from_str::<Vec<String>>(raw).map_err(|_| {
            Error::InvalidArgument(String::from("cuisine_ids must be a JSON array of ids"))
        }),
    }
}

async fn get_restaurants(
    State(ctx): State<Arc<Context>>,
    pagination: Pagination,
    Query(filters): Query<RestaurantFilters>,
) -> error::Result<impl IntoResponse> {
    let min_rating = filters
        .min_rating
        .as_deref()
        .map(|raw| parse_decimal("min_rating", raw))
        .transpose()?;

    let restaurants = ctx
        .restaurants
        .list(
            pagination,
            FindManyFilters {
                cuisine_id: filters.cuisine_id,
                min_rating,
                search: filters.search.filter(|search| !search.trim().is_empty()),
                ..Default::default()
            },
        )
        .await?;

    Ok(response::ok("Restaurants fetched", restaurants))
}

async fn get_restaurant(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> error::Result<impl IntoResponse> {
    let restaurant = ctx.restaurants.get_details(&id).await?;
    Ok(response::ok("Restaurant fetched", restaurant))
}

async fn get_restaurant_menu(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
    pagination: Pagination,
) -> error::Result<impl IntoResponse> {
    ctx.restaurants.find(&id).await?;

    let menu_items = ctx
        .menu
        .list(
            pagination,
            MenuFilters {
                restaurant_id: Some(id),
                is_available: Some(true),
                ..Default::default()
            },
        )
        .await?;

    Ok(response::ok("Menu fetched", menu_items))
}

async fn create_restaurant(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
    form: Multipart<CreateRestaurantForm>,
) -> error::Result<impl IntoResponse> {
    let form = form.data;

    if form.name.trim().chars().count() < 2 {
        return Err(Error::InvalidArgument(String::from(
            "Name must be at least 2 characters",
        )));
    }

    let delivery_fee = parse_delivery_fee(form.delivery_fee.as_deref())?;
    let cuisine_ids = parse_cuisine_ids(form.cuisine_ids.as_deref())?;

    let image = match form.image {
        Some(image) => Some(storage::persist_image(&ctx.storage, "restaurants", image).await?),
        None => None,
    };

    let restaurant = ctx
        .restaurants
        .create(CreateRestaurantPayload {
            owner_id: None,
            name: form.name.trim().to_string(),
            description: form.description.unwrap_or_default(),
            address: form.address,
            phone: form.phone,
            email: form.email,
            image,
            delivery_fee: delivery_fee.unwrap_or_else(|| BigDecimal::from(0)),
            cuisine_ids,
        })
        .await?;

    tracing::info!("Restaurant {} created", restaurant.id);

    Ok(response::created("Restaurant created", restaurant))
}

async fn update_restaurant(
    State(ctx): State<Arc<Context>>,
    auth: AdminOrOwnerAuth,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateRestaurantBody>,
) -> error::Result<impl IntoResponse> {
    let delivery_fee = parse_delivery_fee(body.delivery_fee.as_deref())?;

    let restaurant = ctx
        .restaurants
        .update(
            &auth.user,
            &id,
            UpdateRestaurantPayload {
                name: body.name,
                description: body.description,
                address: body.address,
                phone: body.phone,
                email: body.email,
                image: None,
                delivery_fee,
                is_active: body.is_active,
                cuisine_ids: body.cuisine_ids,
            },
        )
        .await?;

    Ok(response::ok("Restaurant updated", restaurant))
}

async fn delete_restaurant(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
    Path(id): Path<String>,
) -> error::Result<impl IntoResponse> {
    ctx.restaurants.delete(&id).await?;
    Ok(response::message("Restaurant deleted"))
}

async fn get_working_hours(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> error::Result<impl IntoResponse> {
    let working_hours = ctx.restaurants.working_hours(&id).await?;
    Ok(response::ok("Working hours fetched", working_hours))
}

async fn replace_working_hours(
    State(ctx): State<Arc<Context>>,
    auth: AdminOrOwnerAuth,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<WorkingHoursBody>,
) -> error::Result<impl IntoResponse> {
    let working_hours = ctx
        .restaurants
        .replace_working_hours(&auth.user, &id, body.working_hours)
        .await?;

    Ok(response::ok("Working hours updated", working_hours))
}

async fn assign_owner(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<AssignOwnerBody>,
) -> error::Result<impl IntoResponse> {
    let restaurant = ctx.restaurants.assign_owner(&id, &body.email).await?;
    Ok(response::ok("Restaurant owner assigned", restaurant))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_restaurants).post(create_restaurant))
        .route(
            "/:id",
            get(get_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
        .route("/:id/menu", get(get_restaurant_menu))
        .route(
            "/:id/working-hours",
            get(get_working_hours).put(replace_working_hours),
        )
        .route("/:id/owner", post(assign_owner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_cuisine_ids_from_json_text() {
        assert_eq!(
            parse_cuisine_ids(Some(r#"["a","b"]"#)).unwrap(),
            vec![String::from("a"), String::from("b")]
        );
        assert!(parse_cuisine_ids(None).unwrap().is_empty());
        assert!(parse_cuisine_ids(Some("  ")).unwrap().is_empty());
        assert!(matches!(
            parse_cuisine_ids(Some("a,b")),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn delivery_fee_must_not_be_negative() {
        assert!(parse_delivery_fee(None).unwrap().is_none());
        assert!(parse_delivery_fee(Some("2.50")).unwrap().is_some());
        assert!(parse_delivery_fee(Some("-1")).is_err());
        assert!(parse_delivery_fee(Some("free")).is_err());
    }
}
