use super::{service::service, types::request};
use crate::{modules::auth::middleware::Auth, types::Context, utils::extract::ValidatedJson};
use axum::{extract::State, response::IntoResponse};
use std::sync::Arc;

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    ValidatedJson(body): ValidatedJson<request::Body>,
) -> impl IntoResponse {
    service(ctx, request::Payload { auth, body }).await
}
