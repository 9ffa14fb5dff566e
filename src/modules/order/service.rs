use bigdecimal::BigDecimal;
use itertools::Itertools;
use std::sync::Arc;

use super::repository::{
    CreateOrderItemPayload, CreateOrderPayload, FindManyFilters, FullOrder, Order,
    OrderRepository, OrderStatus, OrderStatusHistory, PaymentMethod, PaymentStatus,
};
use crate::{
    error::{Error, Result},
    modules::{
        cart::repository::CartRepository,
        restaurant::repository::{self as restaurant_repository, RestaurantRepository},
        user::repository::{self as user_repository, User},
    },
    utils::pagination::{Paginated, Pagination},
};

pub const MIN_DELIVERY_ADDRESS_LENGTH: usize = 10;

pub struct PlaceOrderPayload {
    pub user_id: String,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
}

/// Raw values as received; unknown strings are rejected before anything is
/// written.
#[derive(Default)]
pub struct UpdateOrderPayload {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    carts: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
}

impl OrderService {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
    ) -> Self {
        Self {
            carts,
            orders,
            restaurants,
        }
    }

    /// Turns the user's cart into a pending order priced from the current
    /// menu. The ordered lines are then taken out of the cart; failing to do
    /// so does not undo the order.
    pub async fn place_order(&self, payload: PlaceOrderPayload) -> Result<FullOrder> {
        let delivery_address = payload.delivery_address.trim().to_string();
        if delivery_address.chars().count() < MIN_DELIVERY_ADDRESS_LENGTH {
            return Err(Error::InvalidArgument(format!(
                "Delivery address must be at least {} characters",
                MIN_DELIVERY_ADDRESS_LENGTH
            )));
        }

        let cart = self
            .carts
            .find_or_create_by_user_id(&payload.user_id)
            .await?;
        let lines = self.carts.find_lines(&cart.id).await?;

        if lines.is_empty() {
            return Err(Error::InvalidState(String::from("Cart is empty")));
        }

        let lines = lines
            .into_iter()
            .map(|line| match line.menu_item {
                Some(menu_item) => Ok((line.item, menu_item)),
                None => Err(Error::NotFound(format!(
                    "Menu item {} no longer exists",
                    line.item.menu_item_id
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        let restaurant_ids = lines
            .iter()
            .map(|(_, menu_item)| menu_item.restaurant_id.clone())
            .unique()
            .collect::<Vec<_>>();

        if restaurant_ids.len() > 1 {
            return Err(Error::InvalidArgument(String::from(
                "Items from different restaurants cannot be combined in a single order",
            )));
        }

        if let Some((_, menu_item)) = lines.iter().find(|(_, menu_item)| !menu_item.is_available)
        {
            return Err(Error::InvalidState(format!(
                "Menu item {} is currently unavailable",
                menu_item.name
            )));
        }

        let restaurant_id = restaurant_ids
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidState(String::from("Cart is empty")))?;

        let ordered = lines
            .iter()
            .map(|(item, _)| item.clone())
            .collect::<Vec<_>>();

        let items = lines
            .into_iter()
            .map(|(item, menu_item)| CreateOrderItemPayload {
                menu_item_id: menu_item.id,
                name: menu_item.name,
                price: menu_item.price,
                quantity: item.quantity,
            })
            .collect::<Vec<_>>();

        let total_amount = items
            .iter()
            .map(|item| item.price.clone() * BigDecimal::from(item.quantity))
            .fold(BigDecimal::from(0), |total, subtotal| total + subtotal);

        let order = self
            .orders
            .create(CreateOrderPayload {
                user_id: payload.user_id,
                restaurant_id,
                delivery_address,
                payment_method: payload.payment_method,
                total_amount,
                items,
            })
            .await?;

        if let Err(err) = self.carts.remove_ordered(&cart.id, &ordered).await {
            tracing::error!(
                "Order {} was placed but cart {} could not be cleared: {}",
                order.order.id,
                cart.id,
                err
            );
        }

        Ok(order)
    }

    async fn find_order(&self, id: &str) -> Result<FullOrder> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Order"))
    }

    async fn manages_restaurant(&self, actor: &User, restaurant_id: &str) -> Result<bool> {
        if user_repository::is_admin(actor) {
            return Ok(true);
        }

        if !user_repository::is_owner(actor) {
            return Ok(false);
        }

        Ok(self
            .restaurants
            .find_by_id(restaurant_id)
            .await?
            .map(|restaurant| restaurant_repository::can_manage(actor, &restaurant))
            .unwrap_or(false))
    }

    /// Customers see their own orders; admins and the restaurant's owner see
    /// every order of that restaurant. Anything else reads as missing.
    pub async fn get(&self, actor: &User, id: &str) -> Result<FullOrder> {
        let order = self.find_order(id).await?;

        if order.order.user_id == actor.id
            || self.manages_restaurant(actor, &order.order.restaurant_id).await?
        {
            return Ok(order);
        }

        Err(Error::not_found("Order"))
    }

    pub async fn history(&self, actor: &User, id: &str) -> Result<Vec<OrderStatusHistory>> {
        let order = self.get(actor, id).await?;
        Ok(self.orders.find_history(&order.order.id).await?)
    }

    pub async fn list_for_customer(
        &self,
        user_id: &str,
        pagination: Pagination,
    ) -> Result<Paginated<Order>> {
        Ok(self
            .orders
            .find_many(
                pagination,
                FindManyFilters {
                    user_id: Some(user_id.to_string()),
                    ..Default::default()
                },
            )
            .await?)
    }

    /// Admins see every order, owners the orders of their restaurants.
    pub async fn list_for_manager(
        &self,
        actor: &User,
        pagination: Pagination,
        status: Option<OrderStatus>,
        restaurant_id: Option<String>,
    ) -> Result<Paginated<Order>> {
        let owner_id = match user_repository::is_admin(actor) {
            true => None,
            false => Some(actor.id.clone()),
        };

        Ok(self
            .orders
            .find_many(
                pagination,
                FindManyFilters {
                    owner_id,
                    restaurant_id,
                    status,
                    ..Default::default()
                },
            )
            .await?)
    }

    async fn authorize_manager(&self, actor: &User, id: &str) -> Result<FullOrder> {
        let order = self.find_order(id).await?;

        if !self.manages_restaurant(actor, &order.order.restaurant_id).await? {
            return Err(Error::PermissionDenied(String::from(
                "You do not manage this restaurant",
            )));
        }

        Ok(order)
    }

    pub async fn update_status(&self, actor: &User, id: &str, status: &str) -> Result<Order> {
        let next = status.parse::<OrderStatus>()?;
        let order = self.authorize_manager(actor, id).await?;
        self.transition(actor, order.order, next, None).await
    }

    async fn transition(
        &self,
        actor: &User,
        order: Order,
        next: OrderStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Order> {
        if !order.status.can_transition_to(next) {
            return Err(Error::InvalidState(format!(
                "Cannot move an order from {} to {}",
                order.status, next
            )));
        }

        self.orders
            .update_status(&order.id, order.status, next, payment_status, &actor.id)
            .await?
            .ok_or_else(|| {
                Error::InvalidState(String::from(
                    "Order status changed while updating, please retry",
                ))
            })
    }

    pub async fn update_payment_status(
        &self,
        actor: &User,
        id: &str,
        payment_status: &str,
    ) -> Result<Order> {
        let payment_status = payment_status.parse::<PaymentStatus>()?;
        self.authorize_manager(actor, id).await?;

        self.orders
            .update_payment_status(id, payment_status)
            .await?
            .ok_or_else(|| Error::not_found("Order"))
    }

    /// Applies a status and/or payment status change. Both values are parsed
    /// before anything is written, and a combined change is a single write:
    /// a rejected transition leaves the payment status untouched.
    pub async fn update(
        &self,
        actor: &User,
        id: &str,
        payload: UpdateOrderPayload,
    ) -> Result<Order> {
        let status = payload
            .status
            .as_deref()
            .map(str::parse::<OrderStatus>)
            .transpose()?;
        let payment_status = payload
            .payment_status
            .as_deref()
            .map(str::parse::<PaymentStatus>)
            .transpose()?;

        if status.is_none() && payment_status.is_none() {
            return Err(Error::InvalidArgument(String::from(
                "Provide a status or a payment_status",
            )));
        }

        let order = self.authorize_manager(actor, id).await?.order;

        match (status, payment_status) {
            (Some(next), payment_status) => {
                self.transition(actor, order, next, payment_status).await
            }
            (None, Some(payment_status)) => self
                .orders
                .update_payment_status(id, payment_status)
                .await?
                .ok_or_else(|| Error::not_found("Order")),
            (None, None) => Ok(order),
        }
    }
}
