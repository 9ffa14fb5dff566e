use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::PgPool;
use ulid::Ulid;

use crate::utils::database::{log_error, Result};

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Address {
    pub id: String,
    pub user_id: String,
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub struct CreateAddressPayload {
    pub user_id: String,
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

#[derive(Default)]
pub struct UpdateAddressPayload {
    pub label: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub is_default: Option<bool>,
}

#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn create(&self, payload: CreateAddressPayload) -> Result<Address>;
    async fn find_many_by_user_id(&self, user_id: &str) -> Result<Vec<Address>>;
    async fn find_by_id_and_user_id(&self, id: &str, user_id: &str) -> Result<Option<Address>>;
    async fn update_by_id(&self, id: &str, payload: UpdateAddressPayload)
        -> Result<Option<Address>>;
    /// Clears the default flag on every address of the user except `keep_id`.
    async fn unset_defaults(&self, user_id: &str, keep_id: Option<&str>) -> Result<()>;
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
}

pub struct PgAddressRepository {
    pool: PgPool,
}

impl PgAddressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, user_id, label, street, city, state, postal_code, country, is_default, created_at, updated_at";

#[async_trait]
impl AddressRepository for PgAddressRepository {
    async fn create(&self, payload: CreateAddressPayload) -> Result<Address> {
        sqlx::query_as::<_, Address>(&format!(
            "
            INSERT INTO addresses (
                id, user_id, label, street, city, state, postal_code, country, is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            ",
            COLUMNS
        ))
        .bind(Ulid::new().to_string())
        .bind(payload.user_id)
        .bind(payload.label)
        .bind(payload.street)
        .bind(payload.city)
        .bind(payload.state)
        .bind(payload.postal_code)
        .bind(payload.country)
        .bind(payload.is_default)
        .fetch_one(&self.pool)
        .await
        .map_err(log_error("creating an address"))
    }

    async fn find_many_by_user_id(&self, user_id: &str) -> Result<Vec<Address>> {
        sqlx::query_as::<_, Address>(&format!(
            "
            SELECT {} FROM addresses
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY is_default DESC, created_at DESC
            ",
            COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(log_error(&format!("fetching addresses of user {}", user_id)))
    }

    async fn find_by_id_and_user_id(&self, id: &str, user_id: &str) -> Result<Option<Address>> {
        sqlx::query_as::<_, Address>(&format!(
            "
            SELECT {} FROM addresses
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            ",
            COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("fetching address with id {}", id)))
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateAddressPayload,
    ) -> Result<Option<Address>> {
        sqlx::query_as::<_, Address>(&format!(
            "
            UPDATE addresses SET
                label = COALESCE($2, label),
                street = COALESCE($3, street),
                city = COALESCE($4, city),
                state = COALESCE($5, state),
                postal_code = COALESCE($6, postal_code),
                country = COALESCE($7, country),
                is_default = COALESCE($8, is_default),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            ",
            COLUMNS
        ))
        .bind(id)
        .bind(payload.label)
        .bind(payload.street)
        .bind(payload.city)
        .bind(payload.state)
        .bind(payload.postal_code)
        .bind(payload.country)
        .bind(payload.is_default)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("updating address with id {}", id)))
    }

    async fn unset_defaults(&self, user_id: &str, keep_id: Option<&str>) -> Result<()> {
        sqlx::query(
            "
            UPDATE addresses SET is_default = FALSE, updated_at = NOW()
            WHERE
                user_id = $1
                AND is_default
                AND deleted_at IS NULL
                AND ($2::VARCHAR IS NULL OR id <> $2)
            ",
        )
        .bind(user_id)
        .bind(keep_id)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(log_error(&format!(
            "unsetting default addresses of user {}",
            user_id
        )))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        sqlx::query("UPDATE addresses SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected() > 0)
            .map_err(log_error(&format!("deleting address with id {}", id)))
    }
}
