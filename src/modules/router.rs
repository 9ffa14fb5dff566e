use crate::types::Context;
use axum::{response::IntoResponse, routing::get, Router};
use std::sync::Arc;

use super::{address, admin, auth, cart, category, cuisine, menu, order, owner, restaurant};
use crate::utils::response;

async fn health_check() -> impl IntoResponse {
    response::message("Foodie API is running")
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(health_check))
        .nest("/auth", auth::routes::get_router())
        .nest("/addresses", address::routes::get_router())
        .nest("/categories", category::routes::get_router())
        .nest("/cuisines", cuisine::routes::get_router())
        .nest("/restaurants", restaurant::routes::get_router())
        .nest("/menu", menu::routes::get_router())
        .nest("/cart", cart::routes::get_router())
        .nest("/orders", order::routes::get_router())
        .nest("/owner", owner::routes::get_router())
        .nest("/admin", admin::routes::get_router())
}
