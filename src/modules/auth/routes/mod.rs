mod login;
mod me;
mod refresh;
mod register;

use crate::types::Context;
use axum::routing::Router;
use std::sync::Arc;

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .nest("/register", register::get_router())
        .nest("/login", login::get_router())
        .nest("/refresh", refresh::get_router())
        .nest("/me", me::get_router())
}
