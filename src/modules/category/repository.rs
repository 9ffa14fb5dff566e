use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::PgPool;
use ulid::Ulid;

use crate::utils::database::{log_error, Result};

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub struct CreateCategoryPayload {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

#[derive(Default)]
pub struct UpdateCategoryPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, payload: CreateCategoryPayload) -> Result<Category>;
    async fn find_many(&self) -> Result<Vec<Category>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>>;
    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateCategoryPayload,
    ) -> Result<Option<Category>>;
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, payload: CreateCategoryPayload) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            "
            INSERT INTO categories (id, name, description, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, is_active, created_at, updated_at
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(log_error("creating a category"))
    }

    async fn find_many(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            "
            SELECT id, name, description, is_active, created_at, updated_at
            FROM categories
            WHERE deleted_at IS NULL
            ORDER BY name
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(log_error("fetching categories"))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "
            SELECT id, name, description, is_active, created_at, updated_at
            FROM categories
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("fetching category with id {}", id)))
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateCategoryPayload,
    ) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "
            UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, description, is_active, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("updating category with id {}", id)))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        sqlx::query("UPDATE categories SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected() > 0)
            .map_err(log_error(&format!("deleting category with id {}", id)))
    }
}
