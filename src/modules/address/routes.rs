use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use super::repository::{CreateAddressPayload, UpdateAddressPayload};
use crate::{
    error::Result,
    modules::auth::middleware::Auth,
    types::Context,
    utils::{extract::ValidatedJson, response},
};

#[derive(Deserialize, Validate)]
struct CreateAddressBody {
    #[validate(length(min = 1, max = 64, code = "INVALID_LABEL"))]
    label: String,
    #[validate(length(min = 3, max = 255, code = "INVALID_STREET"))]
    street: String,
    #[validate(length(min = 2, max = 128, code = "INVALID_CITY"))]
    city: String,
    #[validate(length(min = 2, max = 128, code = "INVALID_STATE"))]
    state: String,
    #[validate(length(min = 2, max = 20, code = "INVALID_POSTAL_CODE"))]
    postal_code: String,
    #[validate(length(min = 2, max = 128, code = "INVALID_COUNTRY"))]
    country: String,
    #[serde(default)]
    is_default: bool,
}

#[derive(Deserialize, Validate)]
struct UpdateAddressBody {
    #[validate(length(min = 1, max = 64, code = "INVALID_LABEL"))]
    label: Option<String>,
    #[validate(length(min = 3, max = 255, code = "INVALID_STREET"))]
    street: Option<String>,
    #[validate(length(min = 2, max = 128, code = "INVALID_CITY"))]
    city: Option<String>,
    #[validate(length(min = 2, max = 128, code = "INVALID_STATE"))]
    state: Option<String>,
    #[validate(length(min = 2, max = 20, code = "INVALID_POSTAL_CODE"))]
    postal_code: Option<String>,
    #[validate(length(min = 2, max = 128, code = "INVALID_COUNTRY"))]
    country: Option<String>,
    is_default: Option<bool>,
}

async fn get_addresses(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
) -> Result<impl IntoResponse> {
    let addresses = ctx.addresses.list(&auth.user.id).await?;
    Ok(response::ok("Addresses fetched", addresses))
}

async fn create_address(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    ValidatedJson(body): ValidatedJson<CreateAddressBody>,
) -> Result<impl IntoResponse> {
    let address = ctx
        .addresses
        .create(CreateAddressPayload {
            user_id: auth.user.id,
            label: body.label,
            street: body.street,
            city: body.city,
            state: body.state,
            postal_code: body.postal_code,
            country: body.country,
            is_default: body.is_default,
        })
        .await?;

    Ok(response::created("Address created", address))
}

async fn update_address(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateAddressBody>,
) -> Result<impl IntoResponse> {
    let address = ctx
        .addresses
        .update(
            &auth.user.id,
            &id,
            UpdateAddressPayload {
                label: body.label,
                street: body.street,
                city: body.city,
                state: body.state,
                postal_code: body.postal_code,
                country: body.country,
                is_default: body.is_default,
            },
        )
        .await?;

    Ok(response::ok("Address updated", address))
}

async fn delete_address(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    ctx.addresses.delete(&auth.user.id, &id).await?;
    Ok(response::message("Address deleted"))
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_addresses).post(create_address))
        .route("/:id", put(update_address).delete(delete_address))
}
