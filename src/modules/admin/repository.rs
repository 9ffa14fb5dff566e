use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::PgPool;

use crate::{
    modules::{order::repository::OrderStatus, user::repository::Role},
    utils::{
        database::{log_error, Result},
        pagination::{Paginated, Pagination},
    },
};

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Overview {
    pub total_users: i64,
    pub total_orders: i64,
    pub total_revenue: BigDecimal,
    pub active_restaurants: i64,
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct DailyOrders {
    pub day: NaiveDate,
    pub orders: i64,
    pub revenue: BigDecimal,
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct PopularItem {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i64,
    pub revenue: BigDecimal,
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct MonthlyRevenue {
    pub month: String,
    pub orders: i64,
    pub revenue: BigDecimal,
}

#[derive(Serialize, Clone, Debug)]
pub struct Analytics {
    pub daily_orders: Vec<DailyOrders>,
    pub popular_items: Vec<PopularItem>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct CustomerSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub total_orders: i64,
    pub total_spent: BigDecimal,
    pub last_order_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn overview(&self) -> Result<Overview>;
    async fn analytics(&self) -> Result<Analytics>;
    async fn customers(&self, pagination: Pagination) -> Result<Paginated<CustomerSummary>>;
}

pub struct PgStatsRepository {
    pool: PgPool,
}

impl PgStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn overview(&self) -> Result<Overview> {
        sqlx::query_as::<_, Overview>(
            "
            SELECT
                (SELECT COUNT(*) FROM users WHERE deleted_at IS NULL) AS total_users,
                (SELECT COUNT(*) FROM orders WHERE deleted_at IS NULL) AS total_orders,
                (
                    SELECT COALESCE(SUM(total_amount), 0)
                    FROM orders
                    WHERE deleted_at IS NULL AND status <> $1
                ) AS total_revenue,
                (
                    SELECT COUNT(*)
                    FROM restaurants
                    WHERE deleted_at IS NULL AND is_active
                ) AS active_restaurants
            ",
        )
        .bind(OrderStatus::Cancelled)
        .fetch_one(&self.pool)
        .await
        .map_err(log_error("computing dashboard overview"))
    }

    async fn analytics(&self) -> Result<Analytics> {
        let daily_orders = sqlx::query_as::<_, DailyOrders>(
            "
            SELECT
                DATE(created_at) AS day,
                COUNT(*) AS orders,
                COALESCE(SUM(total_amount), 0) AS revenue
            FROM orders
            WHERE
                deleted_at IS NULL
                AND created_at >= NOW() - INTERVAL '30 days'
            GROUP BY day
            ORDER BY day
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(log_error("computing daily orders"))?;

        let popular_items = sqlx::query_as::<_, PopularItem>(
            "
            SELECT
                order_items.menu_item_id,
                MAX(order_items.name) AS name,
                SUM(order_items.quantity)::BIGINT AS quantity,
                SUM(order_items.price * order_items.quantity) AS revenue
            FROM order_items
            INNER JOIN orders ON orders.id = order_items.order_id
            WHERE orders.deleted_at IS NULL AND orders.status <> $1
            GROUP BY order_items.menu_item_id
            ORDER BY quantity DESC
            LIMIT 10
            ",
        )
        .bind(OrderStatus::Cancelled)
        .fetch_all(&self.pool)
        .await
        .map_err(log_error("computing popular items"))?;

        let monthly_revenue = sqlx::query_as::<_, MonthlyRevenue>(
            "
            SELECT
                TO_CHAR(DATE_TRUNC('month', created_at), 'YYYY-MM') AS month,
                COUNT(*) AS orders,
                COALESCE(SUM(total_amount), 0) AS revenue
            FROM orders
            WHERE
                deleted_at IS NULL
                AND status <> $1
                AND created_at >= DATE_TRUNC('month', NOW()) - INTERVAL '11 months'
            GROUP BY month
            ORDER BY month
            ",
        )
        .bind(OrderStatus::Cancelled)
        .fetch_all(&self.pool)
        .await
        .map_err(log_error("computing monthly revenue"))?;

        Ok(Analytics {
            daily_orders,
            popular_items,
            monthly_revenue,
        })
    }

    async fn customers(&self, pagination: Pagination) -> Result<Paginated<CustomerSummary>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE role = $1 AND deleted_at IS NULL",
        )
        .bind(Role::Customer)
        .fetch_one(&self.pool)
        .await
        .map_err(log_error("counting customers"))?;

        let customers = sqlx::query_as::<_, CustomerSummary>(
            "
            SELECT
                users.id,
                users.name,
                users.email,
                users.phone,
                users.created_at,
                COUNT(orders.id) AS total_orders,
                COALESCE(SUM(orders.total_amount), 0) AS total_spent,
                MAX(orders.created_at) AS last_order_at
            FROM users
            LEFT JOIN orders ON orders.user_id = users.id AND orders.deleted_at IS NULL
            WHERE users.role = $1 AND users.deleted_at IS NULL
            GROUP BY users.id
            ORDER BY total_spent DESC, users.created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(Role::Customer)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(log_error("fetching customers"))?;

        Ok(Paginated::new(customers, total as u32, &pagination))
    }
}
