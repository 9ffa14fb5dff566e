use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::repository::{
    self, CreateRestaurantPayload, FindManyFilters, Restaurant, RestaurantRepository,
    UpdateRestaurantPayload, WorkingHour, WorkingHourPayload,
};
use crate::{
    error::{Error, Result},
    modules::{
        auth::service::auth::normalize_email,
        cuisine::repository::{Cuisine, CuisineRepository},
        menu::repository::{self as menu_repository, MenuItem, MenuItemRepository},
        user::repository::{User, UserRepository},
    },
    utils::{
        pagination::{Paginated, Pagination, MAX_LIMIT},
        validation::validate_time_of_day,
    },
};

#[derive(Serialize, Clone, Debug)]
pub struct RestaurantDetails {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub cuisines: Vec<Cuisine>,
    pub working_hours: Vec<WorkingHour>,
    pub menu_items: Vec<MenuItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct WorkingHourInput {
    #[validate(range(min = 0, max = 6, code = "INVALID_DAY_OF_WEEK"))]
    pub day_of_week: i16,
    #[validate(custom(function = "validate_time_of_day"))]
    pub open_time: String,
    #[validate(custom(function = "validate_time_of_day"))]
    pub close_time: String,
    #[serde(default)]
    pub is_closed: bool,
}

#[derive(Clone)]
pub struct RestaurantService {
    restaurants: Arc<dyn RestaurantRepository>,
    cuisines: Arc<dyn CuisineRepository>,
    menu_items: Arc<dyn MenuItemRepository>,
    users: Arc<dyn UserRepository>,
}

impl RestaurantService {
    pub fn new(
        restaurants: Arc<dyn RestaurantRepository>,
        cuisines: Arc<dyn CuisineRepository>,
        menu_items: Arc<dyn MenuItemRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            restaurants,
            cuisines,
            menu_items,
            users,
        }
    }

    pub async fn list(
        &self,
        pagination: Pagination,
        filters: FindManyFilters,
    ) -> Result<Paginated<Restaurant>> {
        Ok(self.restaurants.find_many(pagination, filters).await?)
    }

    pub async fn find(&self, id: &str) -> Result<Restaurant> {
        self.restaurants
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Restaurant"))
    }

    pub async fn get_details(&self, id: &str) -> Result<RestaurantDetails> {
        let restaurant = self.find(id).await?;
        let cuisines = self.restaurants.find_cuisines(id).await?;
        let working_hours = self.restaurants.find_working_hours(id).await?;
        let menu_items = self
            .menu_items
            .find_many(
                Pagination::new(Some(1), Some(MAX_LIMIT as i64)),
                menu_repository::FindManyFilters {
                    restaurant_id: Some(id.to_string()),
                    is_available: Some(true),
                    ..Default::default()
                },
            )
            .await?
            .items;

        Ok(RestaurantDetails {
            restaurant,
            cuisines,
            working_hours,
            menu_items,
        })
    }

    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Restaurant>> {
        Ok(self.restaurants.find_many_by_owner_id(owner_id).await?)
    }

    async fn ensure_cuisines_exist(&self, cuisine_ids: &[String]) -> Result<()> {
        for cuisine_id in cuisine_ids {
            if self.cuisines.find_by_id(cuisine_id).await?.is_none() {
                return Err(Error::NotFound(format!("Cuisine {} not found", cuisine_id)));
            }
        }

        Ok(())
    }

    pub async fn create(&self, mut payload: CreateRestaurantPayload) -> Result<Restaurant> {
        payload.cuisine_ids = payload.cuisine_ids.into_iter().unique().collect();
        self.ensure_cuisines_exist(&payload.cuisine_ids).await?;

        Ok(self.restaurants.create(payload).await?)
    }

    /// Loads the restaurant and checks that `actor` may change it.
    pub async fn authorize_manager(&self, actor: &User, id: &str) -> Result<Restaurant> {
        let restaurant = self.find(id).await?;

        if !repository::can_manage(actor, &restaurant) {
            return Err(Error::PermissionDenied(String::from(
                "You do not manage this restaurant",
            )));
        }

        Ok(restaurant)
    }

    pub async fn update(
        &self,
        actor: &User,
        id: &str,
        mut payload: UpdateRestaurantPayload,
    ) -> Result<Restaurant> {
        self.authorize_manager(actor, id).await?;

        if let Some(cuisine_ids) = payload.cuisine_ids.take() {
            let cuisine_ids = cuisine_ids.into_iter().unique().collect::<Vec<_>>();
            self.ensure_cuisines_exist(&cuisine_ids).await?;
            payload.cuisine_ids = Some(cuisine_ids);
        }

        self.restaurants
            .update_by_id(id, payload)
            .await?
            .ok_or_else(|| Error::not_found("Restaurant"))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        match self.restaurants.delete_by_id(id).await? {
            true => Ok(()),
            false => Err(Error::not_found("Restaurant")),
        }
    }

    pub async fn working_hours(&self, id: &str) -> Result<Vec<WorkingHour>> {
        self.find(id).await?;
        Ok(self.restaurants.find_working_hours(id).await?)
    }

    /// Replaces the whole weekly schedule. Days may appear at most once.
    pub async fn replace_working_hours(
        &self,
        actor: &User,
        id: &str,
        hours: Vec<WorkingHourInput>,
    ) -> Result<Vec<WorkingHour>> {
        for hour in &hours {
            hour.validate()?;
        }

        if let Some(day) = hours.iter().map(|hour| hour.day_of_week).duplicates().next() {
            return Err(Error::InvalidArgument(format!(
                "Working hours for day {} given more than once",
                day
            )));
        }

        self.authorize_manager(actor, id).await?;

        let hours = hours
            .into_iter()
            .map(|hour| WorkingHourPayload {
                day_of_week: hour.day_of_week,
                open_time: hour.open_time,
                close_time: hour.close_time,
                is_closed: hour.is_closed,
            })
            .collect();

        Ok(self.restaurants.replace_working_hours(id, hours).await?)
    }

    /// Makes the account registered under `email` the restaurant's owner.
    pub async fn assign_owner(&self, restaurant_id: &str, email: &str) -> Result<Restaurant> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| Error::not_found("User"))?;

        self.find(restaurant_id).await?;

        let restaurant = self
            .restaurants
            .assign_owner(restaurant_id, &user.id)
            .await?
            .ok_or_else(|| Error::not_found("Restaurant"))?;

        tracing::info!(
            "Assigned user {} as owner of restaurant {}",
            user.id,
            restaurant.id
        );

        Ok(restaurant)
    }
}
