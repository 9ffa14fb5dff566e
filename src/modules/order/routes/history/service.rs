use super::types::response;
use crate::{modules::auth::middleware::Auth, types::Context};
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, auth: Auth, id: String) -> response::Response {
    ctx.orders
        .history(&auth.user, &id)
        .await
        .map(response::Success::History)
}
