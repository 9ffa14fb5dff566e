use super::types::{request, response};
use crate::types::Context;
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    ctx.carts
        .update_item_quantity(&payload.auth.user.id, &payload.id, payload.body.quantity)
        .await
        .map(response::Success::Updated)
}
