use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::Result,
    modules::{
        auth::middleware::{AdminOrOwnerAuth, OwnerAuth},
        order::{repository::OrderStatus, service::UpdateOrderPayload},
    },
    types::Context,
    utils::{extract::ValidatedJson, pagination::Pagination, response},
};

#[derive(Deserialize)]
struct OrderFilters {
    status: Option<String>,
    restaurant_id: Option<String>,
}

#[derive(Deserialize, Validate)]
struct UpdateOrderBody {
    status: Option<String>,
    payment_status: Option<String>,
}

async fn get_restaurants(
    State(ctx): State<Arc<Context>>,
    auth: OwnerAuth,
) -> Result<impl IntoResponse> {
    let restaurants = ctx.restaurants.list_by_owner(&auth.user.id).await?;
    Ok(response::ok("Restaurants fetched", restaurants))
}

async fn get_orders(
    State(ctx): State<Arc<Context>>,
    auth: AdminOrOwnerAuth,
    pagination: Pagination,
    Query(filters): Query<OrderFilters>,
) -> Result<impl IntoResponse> {
    let status = filters
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()?;

    let orders = ctx
        .orders
        .list_for_manager(&auth.user, pagination, status, filters.restaurant_id)
        .await?;

    Ok(response::ok("Orders fetched", orders))
}

async fn update_order(
    State(ctx): State<Arc<Context>>,
    auth: AdminOrOwnerAuth,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateOrderBody>,
) -> Result<impl IntoResponse> {
    let order = ctx
        .orders
        .update(
            &auth.user,
            &id,
            UpdateOrderPayload {
                status: body.status,
                payment_status: body.payment_status,
            },
        )
        .await?;

    tracing::info!(
        "Order {} updated by {}: status={} payment_status={}",
        order.id,
        auth.user.id,
        order.status,
        order.payment_status
    );

    Ok(response::ok("Order updated", order))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/restaurants", get(get_restaurants))
        .route("/orders", get(get_orders))
        .route("/orders/:id", put(update_order))
}
