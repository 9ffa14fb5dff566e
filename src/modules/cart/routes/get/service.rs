use super::types::response;
use crate::{modules::auth::middleware::Auth, types::Context};
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, auth: Auth) -> response::Response {
    ctx.carts
        .get_full_cart(&auth.user.id)
        .await
        .map(response::Success::Cart)
}
