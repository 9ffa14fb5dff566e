use super::types::response;
use crate::{modules::auth::middleware::Auth, types::Context};
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, auth: Auth) -> response::Response {
    ctx.carts.clear_for_user(&auth.user.id).await?;
    Ok(response::Success::Cleared)
}
