use super::types::{request, response};
use crate::{
    modules::auth::service::RegisterPayload, types::Context, utils::extract::ValidatedJson,
};
use axum::extract::State;
use std::sync::Arc;

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    ValidatedJson(body): ValidatedJson<request::Body>,
) -> response::Response {
    let user = ctx
        .auth
        .register(RegisterPayload {
            name: body.name,
            email: body.email,
            password: body.password,
            phone: body.phone,
        })
        .await?;

    tracing::info!("New account registered: {}", user.id);

    Ok(response::Success::Registered(user))
}
