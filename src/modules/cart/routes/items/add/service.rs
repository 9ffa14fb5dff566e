use super::types::{request, response};
use crate::types::Context;
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    ctx.carts
        .add_item(
            &payload.auth.user.id,
            &payload.body.menu_item_id,
            payload.body.quantity,
        )
        .await
        .map(response::Success::Added)
}
