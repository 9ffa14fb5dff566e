use bigdecimal::BigDecimal;
use std::sync::Arc;

use super::repository::{
    CreateMenuItemPayload, FindManyFilters, MenuItem, MenuItemRepository, UpdateMenuItemPayload,
};
use crate::{
    error::{Error, Result},
    modules::{
        category::repository::CategoryRepository,
        restaurant::repository::{self as restaurant_repository, RestaurantRepository},
        user::repository::User,
    },
    utils::pagination::{Paginated, Pagination},
};

fn ensure_positive_price(price: &BigDecimal) -> Result<()> {
    if *price <= BigDecimal::from(0) {
        return Err(Error::InvalidArgument(String::from(
            "Price must be greater than zero",
        )));
    }

    Ok(())
}

#[derive(Clone)]
pub struct MenuService {
    menu_items: Arc<dyn MenuItemRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl MenuService {
    pub fn new(
        menu_items: Arc<dyn MenuItemRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            menu_items,
            restaurants,
            categories,
        }
    }

    pub async fn list(
        &self,
        pagination: Pagination,
        filters: FindManyFilters,
    ) -> Result<Paginated<MenuItem>> {
        Ok(self.menu_items.find_many(pagination, filters).await?)
    }

    pub async fn get(&self, id: &str) -> Result<MenuItem> {
        self.menu_items
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Menu item"))
    }

    async fn authorize_restaurant(&self, actor: &User, restaurant_id: &str) -> Result<()> {
        let restaurant = self
            .restaurants
            .find_by_id(restaurant_id)
            .await?
            .ok_or_else(|| Error::not_found("Restaurant"))?;

        if !restaurant_repository::can_manage(actor, &restaurant) {
            return Err(Error::PermissionDenied(String::from(
                "You do not manage this restaurant",
            )));
        }

        Ok(())
    }

    async fn ensure_category_exists(&self, category_id: Option<&str>) -> Result<()> {
        if let Some(category_id) = category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(Error::not_found("Category"));
            }
        }

        Ok(())
    }

    pub async fn create(&self, actor: &User, payload: CreateMenuItemPayload) -> Result<MenuItem> {
        ensure_positive_price(&payload.price)?;
        self.authorize_restaurant(actor, &payload.restaurant_id)
            .await?;
        self.ensure_category_exists(payload.category_id.as_deref())
            .await?;

        Ok(self.menu_items.create(payload).await?)
    }

    pub async fn update(
        &self,
        actor: &User,
        id: &str,
        payload: UpdateMenuItemPayload,
    ) -> Result<MenuItem> {
        if let Some(price) = &payload.price {
            ensure_positive_price(price)?;
        }

        let menu_item = self.get(id).await?;
        self.authorize_restaurant(actor, &menu_item.restaurant_id)
            .await?;
        self.ensure_category_exists(payload.category_id.as_deref())
            .await?;

        self.menu_items
            .update_by_id(id, payload)
            .await?
            .ok_or_else(|| Error::not_found("Menu item"))
    }

    pub async fn delete(&self, actor: &User, id: &str) -> Result<()> {
        let menu_item = self.get(id).await?;
        self.authorize_restaurant(actor, &menu_item.restaurant_id)
            .await?;

        match self.menu_items.delete_by_id(id).await? {
            true => Ok(()),
            false => Err(Error::not_found("Menu item")),
        }
    }
}
