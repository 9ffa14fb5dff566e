use super::types::response;
use crate::{modules::auth::middleware::Auth, types::Context};
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, auth: Auth, id: String) -> response::Response {
    ctx.carts.remove_item(&auth.user.id, &id).await?;
    Ok(response::Success::Removed)
}
