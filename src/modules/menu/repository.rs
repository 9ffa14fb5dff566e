use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use ulid::Ulid;

use crate::utils::{
    database::{log_error, Result},
    pagination::{Paginated, Pagination},
};

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct MenuItem {
    pub id: String,
    pub restaurant_id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub image: Option<String>,
    pub is_available: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, Default)]
pub struct FindManyFilters {
    pub restaurant_id: Option<String>,
    pub category_id: Option<String>,
    pub is_available: Option<bool>,
}

pub struct CreateMenuItemPayload {
    pub restaurant_id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub image: Option<String>,
    pub is_available: bool,
}

#[derive(Default)]
pub struct UpdateMenuItemPayload {
    pub category_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub image: Option<String>,
    pub is_available: Option<bool>,
}

#[async_trait]
pub trait MenuItemRepository: Send + Sync {
    async fn create(&self, payload: CreateMenuItemPayload) -> Result<MenuItem>;
    /// Soft-deleted items are treated as absent.
    async fn find_by_id(&self, id: &str) -> Result<Option<MenuItem>>;
    async fn find_many(
        &self,
        pagination: Pagination,
        filters: FindManyFilters,
    ) -> Result<Paginated<MenuItem>>;
    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateMenuItemPayload,
    ) -> Result<Option<MenuItem>>;
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &FindManyFilters) {
    query.push(" WHERE menu_items.deleted_at IS NULL");

    if let Some(restaurant_id) = &filters.restaurant_id {
        query
            .push(" AND menu_items.restaurant_id = ")
            .push_bind(restaurant_id.clone());
    }

    if let Some(category_id) = &filters.category_id {
        query
            .push(" AND menu_items.category_id = ")
            .push_bind(category_id.clone());
    }

    if let Some(is_available) = filters.is_available {
        query
            .push(" AND menu_items.is_available = ")
            .push_bind(is_available);
    }
}

pub struct PgMenuItemRepository {
    pool: PgPool,
}

impl PgMenuItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuItemRepository for PgMenuItemRepository {
    async fn create(&self, payload: CreateMenuItemPayload) -> Result<MenuItem> {
        sqlx::query_as::<_, MenuItem>(
            "
            INSERT INTO menu_items (
                id, restaurant_id, category_id, name, description, price, image, is_available
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(payload.restaurant_id)
        .bind(payload.category_id)
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.price)
        .bind(payload.image)
        .bind(payload.is_available)
        .fetch_one(&self.pool)
        .await
        .map_err(log_error("creating a menu item"))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MenuItem>> {
        sqlx::query_as::<_, MenuItem>(
            "SELECT * FROM menu_items WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("fetching menu item with id {}", id)))
    }

    async fn find_many(
        &self,
        pagination: Pagination,
        filters: FindManyFilters,
    ) -> Result<Paginated<MenuItem>> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM menu_items");
        push_filters(&mut count, &filters);

        let (total,) = count
            .build_query_as::<(i64,)>()
            .fetch_one(&self.pool)
            .await
            .map_err(log_error("counting menu items"))?;

        let mut query = QueryBuilder::new("SELECT menu_items.* FROM menu_items");
        push_filters(&mut query, &filters);
        query
            .push(" ORDER BY menu_items.name LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let items = query
            .build_query_as::<MenuItem>()
            .fetch_all(&self.pool)
            .await
            .map_err(log_error("fetching menu items"))?;

        Ok(Paginated::new(items, total as u32, &pagination))
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateMenuItemPayload,
    ) -> Result<Option<MenuItem>> {
        sqlx::query_as::<_, MenuItem>(
            "
            UPDATE menu_items SET
                category_id = COALESCE($2, category_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                image = COALESCE($6, image),
                is_available = COALESCE($7, is_available),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            ",
        )
        .bind(id)
        .bind(payload.category_id)
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.price)
        .bind(payload.image)
        .bind(payload.is_available)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("updating menu item with id {}", id)))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        sqlx::query(
            "UPDATE menu_items SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(log_error(&format!("deleting menu item with id {}", id)))
    }
}
