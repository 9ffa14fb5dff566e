use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::{fmt, str::FromStr};
use ulid::Ulid;

use crate::{
    error, text_column,
    utils::{
        database::{log_error, Result},
        pagination::{Paginated, Pagination},
    },
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// pending -> preparing -> ready -> delivered, and cancelled from any
    /// non-terminal state.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        match (self, next) {
            (OrderStatus::Pending, OrderStatus::Preparing)
            | (OrderStatus::Preparing, OrderStatus::Ready)
            | (OrderStatus::Ready, OrderStatus::Delivered) => true,
            (current, OrderStatus::Cancelled) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = error::Error;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "pending" => Ok(OrderStatus::Pending),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            status => Err(error::Error::InvalidArgument(format!(
                "Unrecognized order status: {}",
                status
            ))),
        }
    }
}

text_column!(OrderStatus);

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = error::Error;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            status => Err(error::Error::InvalidArgument(format!(
                "Unrecognized payment status: {}",
                status
            ))),
        }
    }
}

text_column!(PaymentStatus);

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = error::Error;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            method => Err(error::Error::InvalidArgument(format!(
                "Unsupported payment method: {}",
                method
            ))),
        }
    }
}

text_column!(PaymentMethod);

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub restaurant_id: String,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub delivery_address: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Name and price are copied from the menu item when the order is placed.
#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct OrderStatusHistory {
    pub id: String,
    pub order_id: String,
    pub status: OrderStatus,
    pub changed_by: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Clone, Debug)]
pub struct FullOrder {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Clone, Debug)]
pub struct CreateOrderItemPayload {
    pub menu_item_id: String,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

#[derive(Clone, Debug)]
pub struct CreateOrderPayload {
    pub user_id: String,
    pub restaurant_id: String,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub total_amount: BigDecimal,
    pub items: Vec<CreateOrderItemPayload>,
}

#[derive(Clone, Debug, Default)]
pub struct FindManyFilters {
    pub user_id: Option<String>,
    /// Restricts to orders of restaurants owned by this user.
    pub owner_id: Option<String>,
    pub restaurant_id: Option<String>,
    pub status: Option<OrderStatus>,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Writes the order, its items and the initial history entry atomically.
    async fn create(&self, payload: CreateOrderPayload) -> Result<FullOrder>;
    async fn find_by_id(&self, id: &str) -> Result<Option<FullOrder>>;
    async fn find_many(
        &self,
        pagination: Pagination,
        filters: FindManyFilters,
    ) -> Result<Paginated<Order>>;
    async fn find_history(&self, order_id: &str) -> Result<Vec<OrderStatusHistory>>;
    /// Moves the order from `from` to `to`, optionally setting the payment
    /// status in the same write, and appends a history entry. Returns `None`
    /// when the order is missing or no longer in `from`.
    async fn update_status(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
        payment_status: Option<PaymentStatus>,
        changed_by: &str,
    ) -> Result<Option<Order>>;
    async fn update_payment_status(
        &self,
        id: &str,
        payment_status: PaymentStatus,
    ) -> Result<Option<Order>>;
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &FindManyFilters) {
    query.push(" WHERE orders.deleted_at IS NULL");

    if let Some(user_id) = &filters.user_id {
        query.push(" AND orders.user_id = ").push_bind(user_id.clone());
    }

    if let Some(owner_id) = &filters.owner_id {
        query
            .push(
                " AND orders.restaurant_id IN (SELECT restaurants.id FROM restaurants
                WHERE restaurants.owner_id = ",
            )
            .push_bind(owner_id.clone())
            .push(")");
    }

    if let Some(restaurant_id) = &filters.restaurant_id {
        query
            .push(" AND orders.restaurant_id = ")
            .push_bind(restaurant_id.clone());
    }

    if let Some(status) = filters.status {
        query.push(" AND orders.status = ").push_bind(status);
    }
}

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, payload: CreateOrderPayload) -> Result<FullOrder> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(log_error("starting database transaction"))?;

        let order = sqlx::query_as::<_, Order>(
            "
            INSERT INTO orders (
                id, user_id, restaurant_id, total_amount, status, payment_status,
                payment_method, delivery_address
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(payload.user_id)
        .bind(payload.restaurant_id)
        .bind(payload.total_amount)
        .bind(OrderStatus::Pending)
        .bind(PaymentStatus::Pending)
        .bind(payload.payment_method)
        .bind(payload.delivery_address)
        .fetch_one(&mut *tx)
        .await
        .map_err(log_error("creating an order"))?;

        let mut items = Vec::with_capacity(payload.items.len());
        for item in payload.items {
            let order_item = sqlx::query_as::<_, OrderItem>(
                "
                INSERT INTO order_items (id, order_id, menu_item_id, name, price, quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                ",
            )
            .bind(Ulid::new().to_string())
            .bind(&order.id)
            .bind(item.menu_item_id)
            .bind(item.name)
            .bind(item.price)
            .bind(item.quantity)
            .fetch_one(&mut *tx)
            .await
            .map_err(log_error(&format!("creating items of order {}", order.id)))?;

            items.push(order_item);
        }

        sqlx::query(
            "
            INSERT INTO order_status_history (id, order_id, status, changed_by)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(&order.id)
        .bind(OrderStatus::Pending)
        .bind(&order.user_id)
        .execute(&mut *tx)
        .await
        .map_err(log_error(&format!("recording history of order {}", order.id)))?;

        tx.commit()
            .await
            .map_err(log_error("committing order creation"))?;

        Ok(FullOrder { order, items })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<FullOrder>> {
        let order =
            sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(log_error(&format!("fetching order with id {}", id)))?;

        let order = match order {
            Some(order) => order,
            None => return Ok(None),
        };

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(log_error(&format!("fetching items of order {}", id)))?;

        Ok(Some(FullOrder { order, items }))
    }

    async fn find_many(
        &self,
        pagination: Pagination,
        filters: FindManyFilters,
    ) -> Result<Paginated<Order>> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM orders");
        push_filters(&mut count, &filters);

        let (total,) = count
            .build_query_as::<(i64,)>()
            .fetch_one(&self.pool)
            .await
            .map_err(log_error("counting orders"))?;

        let mut query = QueryBuilder::new("SELECT orders.* FROM orders");
        push_filters(&mut query, &filters);
        query
            .push(" ORDER BY orders.created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let orders = query
            .build_query_as::<Order>()
            .fetch_all(&self.pool)
            .await
            .map_err(log_error("fetching orders"))?;

        Ok(Paginated::new(orders, total as u32, &pagination))
    }

    async fn find_history(&self, order_id: &str) -> Result<Vec<OrderStatusHistory>> {
        sqlx::query_as::<_, OrderStatusHistory>(
            "SELECT * FROM order_status_history WHERE order_id = $1 ORDER BY created_at, id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(log_error(&format!("fetching history of order {}", order_id)))
    }

    async fn update_status(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
        payment_status: Option<PaymentStatus>,
        changed_by: &str,
    ) -> Result<Option<Order>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(log_error("starting database transaction"))?;

        let order = sqlx::query_as::<_, Order>(
            "
            UPDATE orders SET
                status = $3,
                payment_status = COALESCE($4, payment_status),
                updated_at = NOW()
            WHERE id = $1 AND status = $2 AND deleted_at IS NULL
            RETURNING *
            ",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(payment_status)
        .fetch_optional(&mut *tx)
        .await
        .map_err(log_error(&format!("updating status of order {}", id)))?;

        let order = match order {
            Some(order) => order,
            None => {
                tx.rollback()
                    .await
                    .map_err(log_error("rolling back order status update"))?;
                return Ok(None);
            }
        };

        sqlx::query(
            "
            INSERT INTO order_status_history (id, order_id, status, changed_by)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(id)
        .bind(to)
        .bind(changed_by)
        .execute(&mut *tx)
        .await
        .map_err(log_error(&format!("recording history of order {}", id)))?;

        tx.commit()
            .await
            .map_err(log_error("committing order status update"))?;

        Ok(Some(order))
    }

    async fn update_payment_status(
        &self,
        id: &str,
        payment_status: PaymentStatus,
    ) -> Result<Option<Order>> {
        sqlx::query_as::<_, Order>(
            "
            UPDATE orders SET payment_status = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            ",
        )
        .bind(id)
        .bind(payment_status)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!(
            "updating payment status of order {}",
            id
        )))
    }
}
