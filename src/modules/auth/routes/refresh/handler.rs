use super::types::{request, response};
use crate::{types::Context, utils::extract::ValidatedJson};
use axum::extract::State;
use std::sync::Arc;

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    ValidatedJson(body): ValidatedJson<request::Body>,
) -> response::Response {
    ctx.auth
        .refresh(&body.refresh_token)
        .await
        .map(response::Success::Refreshed)
}
