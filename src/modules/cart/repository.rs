use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::PgPool;
use ulid::Ulid;

use crate::{
    modules::menu::repository::MenuItem,
    utils::database::{log_error, Result},
};

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct CartItem {
    pub id: String,
    pub cart_id: String,
    pub menu_item_id: String,
    pub quantity: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// A cart line joined to its menu item. `menu_item` is `None` once the item
/// has been removed from the menu.
#[derive(Serialize, Clone, Debug)]
pub struct CartLine {
    pub item: CartItem,
    pub menu_item: Option<MenuItem>,
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: String,
    cart_id: String,
    menu_item_id: String,
    quantity: i32,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    menu_restaurant_id: Option<String>,
    menu_category_id: Option<String>,
    menu_name: Option<String>,
    menu_description: Option<String>,
    menu_price: Option<BigDecimal>,
    menu_image: Option<String>,
    menu_is_available: Option<bool>,
    menu_created_at: Option<NaiveDateTime>,
    menu_updated_at: Option<NaiveDateTime>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        let menu_item = match (
            row.menu_restaurant_id,
            row.menu_name,
            row.menu_price,
            row.menu_created_at,
        ) {
            (Some(restaurant_id), Some(name), Some(price), Some(created_at)) => Some(MenuItem {
                id: row.menu_item_id.clone(),
                restaurant_id,
                category_id: row.menu_category_id,
                name,
                description: row.menu_description.unwrap_or_default(),
                price,
                image: row.menu_image,
                is_available: row.menu_is_available.unwrap_or(false),
                created_at,
                updated_at: row.menu_updated_at,
            }),
            _ => None,
        };

        CartLine {
            item: CartItem {
                id: row.id,
                cart_id: row.cart_id,
                menu_item_id: row.menu_item_id,
                quantity: row.quantity,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            menu_item,
        }
    }
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Returns the user's cart, creating it on first access. Safe under
    /// concurrent calls for the same user.
    async fn find_or_create_by_user_id(&self, user_id: &str) -> Result<Cart>;
    /// Inserts a line or adds `quantity` to the existing line for the same
    /// menu item, atomically. Returns `None` when the merged quantity would
    /// exceed `max_quantity`; the line is left unchanged then.
    async fn add_item(
        &self,
        cart_id: &str,
        menu_item_id: &str,
        quantity: i32,
        max_quantity: i32,
    ) -> Result<Option<CartItem>>;
    async fn update_item_quantity(
        &self,
        cart_id: &str,
        item_id: &str,
        quantity: i32,
    ) -> Result<Option<CartItem>>;
    async fn remove_item(&self, cart_id: &str, item_id: &str) -> Result<bool>;
    async fn find_lines(&self, cart_id: &str) -> Result<Vec<CartLine>>;
    /// Deletes every line of the cart, returning how many were removed.
    async fn clear(&self, cart_id: &str) -> Result<u64>;
    /// Takes the given lines out of the cart after they were ordered. A line
    /// whose quantity grew in the meantime keeps the difference; lines added
    /// since are untouched. Returns how many lines were deleted.
    async fn remove_ordered(&self, cart_id: &str, ordered: &[CartItem]) -> Result<u64>;
}

pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn find_or_create_by_user_id(&self, user_id: &str) -> Result<Cart> {
        sqlx::query(
            "
            INSERT INTO carts (id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(log_error(&format!("creating cart for user {}", user_id)))?;

        sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(log_error(&format!("fetching cart of user {}", user_id)))
    }

    async fn add_item(
        &self,
        cart_id: &str,
        menu_item_id: &str,
        quantity: i32,
        max_quantity: i32,
    ) -> Result<Option<CartItem>> {
        sqlx::query_as::<_, CartItem>(
            "
            INSERT INTO cart_items (id, cart_id, menu_item_id, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (cart_id, menu_item_id) DO UPDATE SET
                quantity = cart_items.quantity + EXCLUDED.quantity,
                updated_at = NOW()
            WHERE cart_items.quantity + EXCLUDED.quantity <= $5
            RETURNING *
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(cart_id)
        .bind(menu_item_id)
        .bind(quantity)
        .bind(max_quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("adding item to cart {}", cart_id)))
    }

    async fn update_item_quantity(
        &self,
        cart_id: &str,
        item_id: &str,
        quantity: i32,
    ) -> Result<Option<CartItem>> {
        sqlx::query_as::<_, CartItem>(
            "
            UPDATE cart_items SET quantity = $3, updated_at = NOW()
            WHERE id = $2 AND cart_id = $1
            RETURNING *
            ",
        )
        .bind(cart_id)
        .bind(item_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_error(&format!("updating cart item {}", item_id)))
    }

    async fn remove_item(&self, cart_id: &str, item_id: &str) -> Result<bool> {
        sqlx::query("DELETE FROM cart_items WHERE id = $2 AND cart_id = $1")
            .bind(cart_id)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected() > 0)
            .map_err(log_error(&format!("removing cart item {}", item_id)))
    }

    async fn find_lines(&self, cart_id: &str) -> Result<Vec<CartLine>> {
        sqlx::query_as::<_, CartLineRow>(
            "
            SELECT
                cart_items.*,
                menu_items.restaurant_id AS menu_restaurant_id,
                menu_items.category_id AS menu_category_id,
                menu_items.name AS menu_name,
                menu_items.description AS menu_description,
                menu_items.price AS menu_price,
                menu_items.image AS menu_image,
                menu_items.is_available AS menu_is_available,
                menu_items.created_at AS menu_created_at,
                menu_items.updated_at AS menu_updated_at
            FROM cart_items
            LEFT JOIN menu_items ON
                menu_items.id = cart_items.menu_item_id
                AND menu_items.deleted_at IS NULL
            WHERE cart_items.cart_id = $1
            ORDER BY cart_items.created_at
            ",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await
        .map(|rows| rows.into_iter().map(CartLine::from).collect())
        .map_err(log_error(&format!("fetching lines of cart {}", cart_id)))
    }

    async fn clear(&self, cart_id: &str) -> Result<u64> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected())
            .map_err(log_error(&format!("clearing cart {}", cart_id)))
    }

    async fn remove_ordered(&self, cart_id: &str, ordered: &[CartItem]) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(log_error("starting database transaction"))?;

        let mut removed = 0;
        for item in ordered {
            let deleted = sqlx::query(
                "DELETE FROM cart_items WHERE cart_id = $1 AND id = $2 AND quantity <= $3",
            )
            .bind(cart_id)
            .bind(&item.id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(log_error(&format!("removing ordered cart item {}", item.id)))?
            .rows_affected();

            if deleted > 0 {
                removed += deleted;
                continue;
            }

            sqlx::query(
                "
                UPDATE cart_items SET quantity = quantity - $3, updated_at = NOW()
                WHERE cart_id = $1 AND id = $2 AND quantity > $3
                ",
            )
            .bind(cart_id)
            .bind(&item.id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(log_error(&format!("reducing ordered cart item {}", item.id)))?;
        }

        tx.commit()
            .await
            .map_err(log_error("committing ordered cart cleanup"))?;

        Ok(removed)
    }
}
