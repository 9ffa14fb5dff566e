use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::PgPool;
use ulid::Ulid;

use crate::utils::database::{log_error, Result};

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Cuisine {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub is_popular: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub struct CreateCuisinePayload {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub is_popular: bool,
}

#[derive(Default)]
pub struct UpdateCuisinePayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
    pub is_popular: Option<bool>,
}

#[async_trait]
pub trait CuisineRepository: Send + Sync {
    async fn create(&self, payload: CreateCuisinePayload) -> Result<Cuisine>;
    async fn find_many(&self) -> Result<Vec<Cuisine>>;
    async fn find_popular(&self) -> Result<Vec<Cuisine>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Cuisine>>;
    async fn update_by_id(&self, id: &str, payload: UpdateCuisinePayload)
        -> Result<Option<Cuisine>>;
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
}

pub struct PgCuisineRepository {
    pool: PgPool,
}

impl PgCuisineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, name, description, image, is_active, is_popular, created_at, updated_at";

#[async_trait]
impl CuisineRepository for PgCuisineRepository {
    async fn create(&self, payload: CreateCuisinePayload) -> Result<Cuisine> {
        sqlx::query_as::<_, Cuisine>(&format!(
            "
            INSERT INTO cuisines (id, name, description, image, is_active, is_popular)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            ",
            COLUMNS
        ))
        .bind(Ulid::new().to_string())
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.image)
        .bind(payload.is_active)
        .bind(payload.is_popular)
        .fetch_one(&self.pool)
        .await
        .map_err(log_error("creating a cuisine"))
    }

    async fn find_many(&self) -> Result<Vec<Cuisine>> {
        sqlx::query_as::<_, Cuisine>(&format!(
            "SELECT {} FROM cuisines WHERE deleted_at IS NULL ORDER BY name",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(log_error("fetching cuisines"))
    }

    async fn find_popular(&self) -> Result<Vec<Cuisine>> {
        sqlx::query_as::<_, Cuisine>(&format!(
            "
            SELECT {} FROM cuisines
            WHERE deleted_at IS NULL AND is_active AND is_popular
            ORDER BY name
            ",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(log_error("fetching popular cuisines"))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Cuisine>> {
        sqlx::query_as::<_, Cuisine>(&format!(
            "SELECT {} FROM cuisines WHERE id = $1 AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("fetching cuisine with id {}", id)))
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateCuisinePayload,
    ) -> Result<Option<Cuisine>> {
        sqlx::query_as::<_, Cuisine>(&format!(
            "
            UPDATE cuisines SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image = COALESCE($4, image),
                is_active = COALESCE($5, is_active),
                is_popular = COALESCE($6, is_popular),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            ",
            COLUMNS
        ))
        .bind(id)
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.image)
        .bind(payload.is_active)
        .bind(payload.is_popular)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("updating cuisine with id {}", id)))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        sqlx::query("UPDATE cuisines SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected() > 0)
            .map_err(log_error(&format!("deleting cuisine with id {}", id)))
    }
}
