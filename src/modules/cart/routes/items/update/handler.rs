use super::{service::service, types::request};
use crate::{modules::auth::middleware::Auth, types::Context, utils::extract::ValidatedJson};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use std::sync::Arc;

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<request::Body>,
) -> impl IntoResponse {
    service(ctx, request::Payload { id, auth, body }).await
}
