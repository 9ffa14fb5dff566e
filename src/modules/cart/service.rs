use bigdecimal::BigDecimal;
use serde::Serialize;
use std::sync::Arc;

use super::repository::{Cart, CartItem, CartLine, CartRepository};
use crate::{
    error::{Error, Result},
    modules::menu::repository::MenuItemRepository,
};

#[derive(Serialize, Clone, Debug)]
pub struct FullCart {
    #[serde(flatten)]
    pub cart: Cart,
    pub items: Vec<CartLine>,
    pub total: BigDecimal,
}

pub fn line_total(lines: &[CartLine]) -> BigDecimal {
    lines
        .iter()
        .filter_map(|line| {
            line.menu_item
                .as_ref()
                .map(|menu_item| menu_item.price.clone() * BigDecimal::from(line.item.quantity))
        })
        .fold(BigDecimal::from(0), |total, subtotal| total + subtotal)
}

/// Upper bound for a single cart line.
pub const MAX_QUANTITY: i32 = 999;

fn ensure_quantity(quantity: i32) -> Result<()> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(Error::InvalidArgument(format!(
            "Quantity must be between 1 and {}",
            MAX_QUANTITY
        )));
    }

    Ok(())
}

#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartRepository>,
    menu_items: Arc<dyn MenuItemRepository>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartRepository>, menu_items: Arc<dyn MenuItemRepository>) -> Self {
        Self { carts, menu_items }
    }

    pub async fn get_or_create_cart(&self, user_id: &str) -> Result<Cart> {
        Ok(self.carts.find_or_create_by_user_id(user_id).await?)
    }

    pub async fn get_full_cart(&self, user_id: &str) -> Result<FullCart> {
        let cart = self.get_or_create_cart(user_id).await?;
        let items = self.carts.find_lines(&cart.id).await?;
        let total = line_total(&items);

        Ok(FullCart { cart, items, total })
    }

    pub async fn add_item(
        &self,
        user_id: &str,
        menu_item_id: &str,
        quantity: i32,
    ) -> Result<CartItem> {
        ensure_quantity(quantity)?;

        let menu_item = self
            .menu_items
            .find_by_id(menu_item_id)
            .await?
            .ok_or_else(|| Error::not_found("Menu item"))?;

        if !menu_item.is_available {
            return Err(Error::InvalidState(String::from(
                "Menu item is currently unavailable",
            )));
        }

        let cart = self.get_or_create_cart(user_id).await?;

        self.carts
            .add_item(&cart.id, &menu_item.id, quantity, MAX_QUANTITY)
            .await?
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "A cart line cannot hold more than {} of the same item",
                    MAX_QUANTITY
                ))
            })
    }

    pub async fn update_item_quantity(
        &self,
        user_id: &str,
        cart_item_id: &str,
        quantity: i32,
    ) -> Result<CartItem> {
        ensure_quantity(quantity)?;

        let cart = self.get_or_create_cart(user_id).await?;

        self.carts
            .update_item_quantity(&cart.id, cart_item_id, quantity)
            .await?
            .ok_or_else(|| Error::not_found("Cart item"))
    }

    /// Removing a line that is not in the caller's cart is `NotFound`.
    pub async fn remove_item(&self, user_id: &str, cart_item_id: &str) -> Result<()> {
        let cart = self.get_or_create_cart(user_id).await?;

        match self.carts.remove_item(&cart.id, cart_item_id).await? {
            true => Ok(()),
            false => Err(Error::not_found("Cart item")),
        }
    }

    pub async fn clear(&self, cart_id: &str) -> Result<u64> {
        Ok(self.carts.clear(cart_id).await?)
    }

    pub async fn clear_for_user(&self, user_id: &str) -> Result<u64> {
        let cart = self.get_or_create_cart(user_id).await?;
        self.clear(&cart.id).await
    }
}
