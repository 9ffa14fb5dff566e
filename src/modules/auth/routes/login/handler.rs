use super::types::{request, response};
use crate::{types::Context, utils::extract::ValidatedJson};
use axum::extract::State;
use std::sync::Arc;

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    ValidatedJson(body): ValidatedJson<request::Body>,
) -> response::Response {
    ctx.auth
        .login(&body.email, &body.password)
        .await
        .map(response::Success::LoggedIn)
}
