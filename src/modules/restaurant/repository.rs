use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use ulid::Ulid;

use crate::{
    modules::{
        cuisine::repository::Cuisine,
        user::repository::{self as user_repository, Role, User},
    },
    utils::{
        database::{escape_like, log_error, Result},
        pagination::{Paginated, Pagination},
    },
};

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Restaurant {
    pub id: String,
    pub owner_id: Option<String>,
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub image: Option<String>,
    pub rating: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct WorkingHour {
    pub id: String,
    pub restaurant_id: String,
    pub day_of_week: i16,
    pub open_time: String,
    pub close_time: String,
    pub is_closed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Admins manage every restaurant, owners only the ones assigned to them.
pub fn can_manage(user: &User, restaurant: &Restaurant) -> bool {
    user_repository::is_admin(user)
        || (user_repository::is_owner(user)
            && restaurant.owner_id.as_deref() == Some(user.id.as_str()))
}

#[derive(Clone, Debug, Default)]
pub struct FindManyFilters {
    pub cuisine_id: Option<String>,
    pub min_rating: Option<BigDecimal>,
    pub search: Option<String>,
    pub owner_id: Option<String>,
    pub include_inactive: bool,
}

pub struct CreateRestaurantPayload {
    pub owner_id: Option<String>,
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub image: Option<String>,
    pub delivery_fee: BigDecimal,
    pub cuisine_ids: Vec<String>,
}

#[derive(Default)]
pub struct UpdateRestaurantPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub delivery_fee: Option<BigDecimal>,
    pub is_active: Option<bool>,
    /// `Some` replaces the whole cuisine set.
    pub cuisine_ids: Option<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct WorkingHourPayload {
    pub day_of_week: i16,
    pub open_time: String,
    pub close_time: String,
    pub is_closed: bool,
}

#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    async fn create(&self, payload: CreateRestaurantPayload) -> Result<Restaurant>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Restaurant>>;
    async fn find_many(
        &self,
        pagination: Pagination,
        filters: FindManyFilters,
    ) -> Result<Paginated<Restaurant>>;
    async fn find_many_by_owner_id(&self, owner_id: &str) -> Result<Vec<Restaurant>>;
    async fn find_cuisines(&self, restaurant_id: &str) -> Result<Vec<Cuisine>>;
    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateRestaurantPayload,
    ) -> Result<Option<Restaurant>>;
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
    async fn find_working_hours(&self, restaurant_id: &str) -> Result<Vec<WorkingHour>>;
    async fn replace_working_hours(
        &self,
        restaurant_id: &str,
        hours: Vec<WorkingHourPayload>,
    ) -> Result<Vec<WorkingHour>>;
    /// Sets the restaurant owner and promotes a customer account to owner.
    async fn assign_owner(&self, restaurant_id: &str, user_id: &str)
        -> Result<Option<Restaurant>>;
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &FindManyFilters) {
    query.push(" WHERE restaurants.deleted_at IS NULL");

    if !filters.include_inactive {
        query.push(" AND restaurants.is_active");
    }

    if let Some(cuisine_id) = &filters.cuisine_id {
        query
            .push(
                " AND EXISTS (SELECT 1 FROM restaurant_cuisines
                WHERE restaurant_cuisines.restaurant_id = restaurants.id
                AND restaurant_cuisines.cuisine_id = ",
            )
            .push_bind(cuisine_id.clone())
            .push(")");
    }

    if let Some(min_rating) = &filters.min_rating {
        query
            .push(" AND restaurants.rating >= ")
            .push_bind(min_rating.clone());
    }

    if let Some(search) = &filters.search {
        query
            .push(" AND restaurants.name ILIKE ")
            .push_bind(format!("%{}%", escape_like(search.trim())))
            .push(r" ESCAPE '\'");
    }

    if let Some(owner_id) = &filters.owner_id {
        query
            .push(" AND restaurants.owner_id = ")
            .push_bind(owner_id.clone());
    }
}

pub fn count_query(filters: &FindManyFilters) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM restaurants");
    push_filters(&mut query, filters);
    query
}

pub fn find_many_query(
    pagination: &Pagination,
    filters: &FindManyFilters,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT restaurants.* FROM restaurants");
    push_filters(&mut query, filters);
    query
        .push(" ORDER BY restaurants.rating DESC, restaurants.created_at DESC LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());
    query
}

async fn replace_cuisines(
    tx: &mut Transaction<'_, Postgres>,
    restaurant_id: &str,
    cuisine_ids: &[String],
) -> Result<()> {
    sqlx::query("DELETE FROM restaurant_cuisines WHERE restaurant_id = $1")
        .bind(restaurant_id)
        .execute(&mut **tx)
        .await
        .map_err(log_error("clearing restaurant cuisines"))?;

    if cuisine_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "
        INSERT INTO restaurant_cuisines (restaurant_id, cuisine_id)
        SELECT $1, cuisine_id FROM UNNEST($2::VARCHAR[]) AS cuisine_id
        ON CONFLICT DO NOTHING
        ",
    )
    .bind(restaurant_id)
    .bind(cuisine_ids.to_vec())
    .execute(&mut **tx)
    .await
    .map(|_| ())
    .map_err(log_error("setting restaurant cuisines"))
}

pub struct PgRestaurantRepository {
    pool: PgPool,
}

impl PgRestaurantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RestaurantRepository for PgRestaurantRepository {
    async fn create(&self, payload: CreateRestaurantPayload) -> Result<Restaurant> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(log_error("starting database transaction"))?;

        let restaurant = sqlx::query_as::<_, Restaurant>(
            "
            INSERT INTO restaurants (
                id, owner_id, name, description, address, phone, email, image, delivery_fee
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(payload.owner_id)
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.address)
        .bind(payload.phone)
        .bind(payload.email)
        .bind(payload.image)
        .bind(payload.delivery_fee)
        .fetch_one(&mut *tx)
        .await
        .map_err(log_error("creating a restaurant"))?;

        replace_cuisines(&mut tx, &restaurant.id, &payload.cuisine_ids).await?;

        tx.commit()
            .await
            .map_err(log_error("committing restaurant creation"))?;

        Ok(restaurant)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Restaurant>> {
        sqlx::query_as::<_, Restaurant>(
            "SELECT * FROM restaurants WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("fetching restaurant with id {}", id)))
    }

    async fn find_many(
        &self,
        pagination: Pagination,
        filters: FindManyFilters,
    ) -> Result<Paginated<Restaurant>> {
        let (total,) = count_query(&filters)
            .build_query_as::<(i64,)>()
            .fetch_one(&self.pool)
            .await
            .map_err(log_error("counting restaurants"))?;

        let restaurants = find_many_query(&pagination, &filters)
            .build_query_as::<Restaurant>()
            .fetch_all(&self.pool)
            .await
            .map_err(log_error("fetching restaurants"))?;

        Ok(Paginated::new(restaurants, total as u32, &pagination))
    }

    async fn find_many_by_owner_id(&self, owner_id: &str) -> Result<Vec<Restaurant>> {
        sqlx::query_as::<_, Restaurant>(
            "
            SELECT * FROM restaurants
            WHERE owner_id = $1 AND deleted_at IS NULL
            ORDER BY name
            ",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(log_error(&format!(
            "fetching restaurants owned by {}",
            owner_id
        )))
    }

    async fn find_cuisines(&self, restaurant_id: &str) -> Result<Vec<Cuisine>> {
        sqlx::query_as::<_, Cuisine>(
            "
            SELECT cuisines.*
            FROM cuisines
            INNER JOIN restaurant_cuisines ON restaurant_cuisines.cuisine_id = cuisines.id
            WHERE
                restaurant_cuisines.restaurant_id = $1
                AND cuisines.deleted_at IS NULL
            ORDER BY cuisines.name
            ",
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(log_error(&format!(
            "fetching cuisines of restaurant {}",
            restaurant_id
        )))
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateRestaurantPayload,
    ) -> Result<Option<Restaurant>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(log_error("starting database transaction"))?;

        let restaurant = sqlx::query_as::<_, Restaurant>(
            "
            UPDATE restaurants SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                address = COALESCE($4, address),
                phone = COALESCE($5, phone),
                email = COALESCE($6, email),
                image = COALESCE($7, image),
                delivery_fee = COALESCE($8, delivery_fee),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            ",
        )
        .bind(id)
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.address)
        .bind(payload.phone)
        .bind(payload.email)
        .bind(payload.image)
        .bind(payload.delivery_fee)
        .bind(payload.is_active)
        .fetch_optional(&mut *tx)
        .await
        .map_err(log_error(&format!("updating restaurant with id {}", id)))?;

        if let (Some(restaurant), Some(cuisine_ids)) = (&restaurant, &payload.cuisine_ids) {
            replace_cuisines(&mut tx, &restaurant.id, cuisine_ids).await?;
        }

        tx.commit()
            .await
            .map_err(log_error("committing restaurant update"))?;

        Ok(restaurant)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        sqlx::query(
            "UPDATE restaurants SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(log_error(&format!("deleting restaurant with id {}", id)))
    }

    async fn find_working_hours(&self, restaurant_id: &str) -> Result<Vec<WorkingHour>> {
        sqlx::query_as::<_, WorkingHour>(
            "SELECT * FROM working_hours WHERE restaurant_id = $1 ORDER BY day_of_week",
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(log_error(&format!(
            "fetching working hours of restaurant {}",
            restaurant_id
        )))
    }

    async fn replace_working_hours(
        &self,
        restaurant_id: &str,
        hours: Vec<WorkingHourPayload>,
    ) -> Result<Vec<WorkingHour>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(log_error("starting database transaction"))?;

        sqlx::query("DELETE FROM working_hours WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .execute(&mut *tx)
            .await
            .map_err(log_error("clearing working hours"))?;

        let mut saved = Vec::with_capacity(hours.len());
        for hour in hours {
            let working_hour = sqlx::query_as::<_, WorkingHour>(
                "
                INSERT INTO working_hours (
                    id, restaurant_id, day_of_week, open_time, close_time, is_closed
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                ",
            )
            .bind(Ulid::new().to_string())
            .bind(restaurant_id)
            .bind(hour.day_of_week)
            .bind(hour.open_time)
            .bind(hour.close_time)
            .bind(hour.is_closed)
            .fetch_one(&mut *tx)
            .await
            .map_err(log_error("inserting working hours"))?;

            saved.push(working_hour);
        }

        tx.commit()
            .await
            .map_err(log_error("committing working hours"))?;

        saved.sort_by_key(|hour| hour.day_of_week);
        Ok(saved)
    }

    async fn assign_owner(
        &self,
        restaurant_id: &str,
        user_id: &str,
    ) -> Result<Option<Restaurant>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(log_error("starting database transaction"))?;

        sqlx::query(
            "
            UPDATE users SET role = $2, updated_at = NOW()
            WHERE id = $1 AND role = $3 AND deleted_at IS NULL
            ",
        )
        .bind(user_id)
        .bind(Role::Owner)
        .bind(Role::Customer)
        .execute(&mut *tx)
        .await
        .map_err(log_error(&format!("promoting user {} to owner", user_id)))?;

        let restaurant = sqlx::query_as::<_, Restaurant>(
            "
            UPDATE restaurants SET owner_id = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            ",
        )
        .bind(restaurant_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(log_error(&format!(
            "assigning owner of restaurant {}",
            restaurant_id
        )))?;

        if restaurant.is_none() {
            tx.rollback()
                .await
                .map_err(log_error("rolling back owner assignment"))?;
            return Ok(None);
        }

        tx.commit()
            .await
            .map_err(log_error("committing owner assignment"))?;

        Ok(restaurant)
    }
}
