use super::types::response;
use crate::{modules::auth::middleware::Auth, types::Context, utils::pagination::Pagination};
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, auth: Auth, pagination: Pagination) -> response::Response {
    ctx.orders
        .list_for_customer(&auth.user.id, pagination)
        .await
        .map(response::Success::Orders)
}
