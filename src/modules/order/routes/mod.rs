mod get;
mod history;
mod list;
mod place;

use crate::types::Context;
use axum::routing::Router;
use std::sync::Arc;

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .merge(place::get_router())
        .merge(list::get_router())
        .merge(get::get_router())
        .merge(history::get_router())
}
