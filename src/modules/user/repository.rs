use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::{fmt, str::FromStr};
use ulid::Ulid;

use crate::{
    error,
    text_column,
    utils::{
        database::{log_error, Result},
        pagination::{Paginated, Pagination},
    },
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    #[serde(alias = "restaurant_owner")]
    Owner,
    #[serde(alias = "restaurant_staff")]
    Staff,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Owner => "owner",
            Role::Staff => "staff",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = error::Error;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "customer" => Ok(Role::Customer),
            "owner" | "restaurant_owner" => Ok(Role::Owner),
            "staff" | "restaurant_staff" => Ok(Role::Staff),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            role => Err(error::Error::InvalidArgument(format!(
                "Unrecognized user role: {}",
                role
            ))),
        }
    }
}

text_column!(Role);

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

pub fn is_admin(user: &User) -> bool {
    user.role == Role::Admin
}

pub fn is_owner(user: &User) -> bool {
    user.role == Role::Owner
}

pub struct CreateUserPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
}

/// Fields left as `None` keep their stored value.
#[derive(Default, Clone, Debug)]
pub struct UpdateUserPayload {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub last_login_at: Option<NaiveDateTime>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, payload: CreateUserPayload) -> Result<User>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_many(&self, pagination: Pagination) -> Result<Paginated<User>>;
    async fn update_by_id(&self, id: &str, payload: UpdateUserPayload) -> Result<Option<User>>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, payload: CreateUserPayload) -> Result<User> {
        sqlx::query_as::<_, User>(
            "
            INSERT INTO users (id, name, email, phone, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(payload.name)
        .bind(payload.email)
        .bind(payload.phone)
        .bind(payload.password_hash)
        .bind(payload.role)
        .fetch_one(&self.pool)
        .await
        .map_err(log_error("creating a user account"))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(log_error(&format!("fetching user with id {}", id)))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND deleted_at IS NULL")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(log_error("fetching user by email"))
    }

    async fn find_many(&self, pagination: Pagination) -> Result<Paginated<User>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(log_error("counting users"))?;

        let users = sqlx::query_as::<_, User>(
            "
            SELECT * FROM users
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(log_error("fetching users"))?;

        Ok(Paginated::new(users, total as u32, &pagination))
    }

    async fn update_by_id(&self, id: &str, payload: UpdateUserPayload) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "
            UPDATE users SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                role = COALESCE($4, role),
                is_active = COALESCE($5, is_active),
                last_login_at = COALESCE($6, last_login_at),
                updated_at = NOW()
            WHERE
                id = $1
                AND deleted_at IS NULL
            RETURNING *
            ",
        )
        .bind(id)
        .bind(payload.name)
        .bind(payload.phone)
        .bind(payload.role)
        .bind(payload.is_active)
        .bind(payload.last_login_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("updating user with id {}", id)))
    }
}
