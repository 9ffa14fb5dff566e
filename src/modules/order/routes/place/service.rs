use super::types::{request, response};
use crate::{
    modules::order::{repository::PaymentMethod, service::PlaceOrderPayload},
    types::Context,
};
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    let payment_method = match payload.body.payment_method.as_deref() {
        Some(raw) => raw.parse::<PaymentMethod>()?,
        None => PaymentMethod::default(),
    };

    let order = ctx
        .orders
        .place_order(PlaceOrderPayload {
            user_id: payload.auth.user.id.clone(),
            delivery_address: payload.body.delivery_address,
            payment_method,
        })
        .await?;

    tracing::info!(
        "Order {} placed by {} for {}",
        order.order.id,
        payload.auth.user.id,
        order.order.total_amount
    );

    Ok(response::Success::Placed(order))
}
