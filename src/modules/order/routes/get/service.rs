use super::types::{request, response};
use crate::types::Context;
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    ctx.orders
        .get(&payload.auth.user, &payload.id)
        .await
        .map(response::Success::Order)
}
