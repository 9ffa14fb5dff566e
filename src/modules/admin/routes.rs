use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::{
    error::Result,
    modules::{auth::middleware::AdminAuth, order::repository::OrderStatus},
    types::Context,
    utils::{pagination::Pagination, response},
};

#[derive(Deserialize)]
struct OrderFilters {
    status: Option<String>,
    restaurant_id: Option<String>,
}

async fn get_overview(State(ctx): State<Arc<Context>>, _: AdminAuth) -> Result<impl IntoResponse> {
    let overview = ctx.repositories.stats.overview().await?;
    Ok(response::ok("Overview fetched", overview))
}

async fn get_analytics(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
) -> Result<impl IntoResponse> {
    let analytics = ctx.repositories.stats.analytics().await?;
    Ok(response::ok("Analytics fetched", analytics))
}

async fn get_customers(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let customers = ctx.repositories.stats.customers(pagination).await?;
    Ok(response::ok("Customers fetched", customers))
}

async fn get_users(
    State(ctx): State<Arc<Context>>,
    _: AdminAuth,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let users = ctx.repositories.users.find_many(pagination).await?;
    Ok(response::ok("Users fetched", users))
}

async fn get_orders(
    State(ctx): State<Arc<Context>>,
    auth: AdminAuth,
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

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/overview", get(get_overview))
        .route("/analytics", get(get_analytics))
        .route("/customers", get(get_customers))
        .route("/users", get(get_users))
        .route("/orders", get(get_orders))
}
