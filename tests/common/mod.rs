#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDateTime, Utc};
use serde_json::Value;
use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use tower::ServiceExt;
use ulid::Ulid;

use foodie_backend_rs::{
    app,
    modules::{
        address::repository::{
            Address, AddressRepository, CreateAddressPayload, UpdateAddressPayload,
        },
        admin::repository::{Analytics, CustomerSummary, Overview, StatsRepository},
        auth::token::{TokenIssuer, TokenType},
        cart::repository::{Cart, CartItem, CartLine, CartRepository},
        category::repository::{
            Category, CategoryRepository, CreateCategoryPayload, UpdateCategoryPayload,
        },
        cuisine::repository::{
            CreateCuisinePayload, Cuisine, CuisineRepository, UpdateCuisinePayload,
        },
        menu::repository::{
            self as menu, CreateMenuItemPayload, MenuItem, MenuItemRepository,
            UpdateMenuItemPayload,
        },
        order::repository::{
            self as order, CreateOrderPayload, FullOrder, Order, OrderItem, OrderRepository,
            OrderStatus, OrderStatusHistory, PaymentStatus,
        },
        restaurant::repository::{
            self as restaurant, CreateRestaurantPayload, Restaurant, RestaurantRepository,
            UpdateRestaurantPayload, WorkingHour, WorkingHourPayload,
        },
        user::repository::{CreateUserPayload, Role, UpdateUserPayload, User, UserRepository},
    },
    types::{AppContext, AppEnvironment, Context, Repositories, StorageContext},
    utils::{
        database::{Error, Result},
        pagination::{Paginated, Pagination},
    },
};

pub const JWT_SECRET: &str = "integration-test-secret";

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn new_id() -> String {
    Ulid::new().to_string()
}

fn paginate<T: Clone>(items: Vec<T>, pagination: &Pagination) -> Paginated<T> {
    let total = items.len() as u32;
    let page = items
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit() as usize)
        .collect();

    Paginated::new(page, total, pagination)
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    addresses: Vec<Address>,
    categories: Vec<Category>,
    cuisines: Vec<Cuisine>,
    restaurants: Vec<Restaurant>,
    restaurant_cuisines: Vec<(String, String)>,
    working_hours: Vec<WorkingHour>,
    menu_items: Vec<MenuItem>,
    carts: Vec<Cart>,
    cart_items: Vec<CartItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    history: Vec<OrderStatusHistory>,
}

/// Implements every repository trait over plain vectors. Deleting a row
/// removes it, which is what soft deletion looks like to readers.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_cart_clear: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_cart_clear(&self, fail: bool) {
        self.fail_cart_clear.store(fail, Ordering::SeqCst);
    }

    pub fn seed_user(&self, email: &str, role: Role) -> User {
        let user = User {
            id: new_id(),
            name: String::from("Test User"),
            email: email.to_string(),
            phone: String::from("+15550000000"),
            password_hash: String::from("not-a-real-hash"),
            role,
            is_active: true,
            last_login_at: None,
            created_at: now(),
            updated_at: None,
            deleted_at: None,
        };

        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn seed_restaurant(&self, name: &str, owner_id: Option<&str>) -> Restaurant {
        let restaurant = Restaurant {
            id: new_id(),
            owner_id: owner_id.map(str::to_string),
            name: name.to_string(),
            description: String::new(),
            address: String::from("1 Test Street"),
            phone: String::from("+15551234567"),
            email: String::from("kitchen@example.com"),
            image: None,
            rating: BigDecimal::from(4),
            delivery_fee: BigDecimal::from(0),
            is_active: true,
            created_at: now(),
            updated_at: None,
        };

        self.state.lock().unwrap().restaurants.push(restaurant.clone());
        restaurant
    }

    pub fn seed_menu_item(&self, restaurant_id: &str, name: &str, price: &str) -> MenuItem {
        let menu_item = MenuItem {
            id: new_id(),
            restaurant_id: restaurant_id.to_string(),
            category_id: None,
            name: name.to_string(),
            description: String::new(),
            price: BigDecimal::from_str(price).unwrap(),
            image: None,
            is_available: true,
            created_at: now(),
            updated_at: None,
        };

        self.state.lock().unwrap().menu_items.push(menu_item.clone());
        menu_item
    }

    pub fn set_menu_item_price(&self, id: &str, price: &str) {
        let mut state = self.state.lock().unwrap();
        let item = state.menu_items.iter_mut().find(|item| item.id == id).unwrap();
        item.price = BigDecimal::from_str(price).unwrap();
    }

    pub fn set_menu_item_available(&self, id: &str, is_available: bool) {
        let mut state = self.state.lock().unwrap();
        let item = state.menu_items.iter_mut().find(|item| item.id == id).unwrap();
        item.is_available = is_available;
    }

    pub fn remove_menu_item(&self, id: &str) {
        self.state.lock().unwrap().menu_items.retain(|item| item.id != id);
    }

    pub fn history_of(&self, order_id: &str) -> Vec<OrderStatusHistory> {
        self.state
            .lock()
            .unwrap()
            .history
            .iter()
            .filter(|entry| entry.order_id == order_id)
            .cloned()
            .collect()
    }

    pub fn cart_item_count(&self, user_id: &str) -> usize {
        let state = self.state.lock().unwrap();
        let Some(cart) = state.carts.iter().find(|cart| cart.user_id == user_id) else {
            return 0;
        };

        state
            .cart_items
            .iter()
            .filter(|item| item.cart_id == cart.id)
            .count()
    }

    /// `(menu_item_id, quantity)` of every line in the user's cart.
    pub fn cart_quantities(&self, user_id: &str) -> Vec<(String, i32)> {
        let state = self.state.lock().unwrap();
        let Some(cart) = state.carts.iter().find(|cart| cart.user_id == user_id) else {
            return vec![];
        };

        state
            .cart_items
            .iter()
            .filter(|item| item.cart_id == cart.id)
            .map(|item| (item.menu_item_id.clone(), item.quantity))
            .collect()
    }

    pub fn order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }

    pub fn user(&self, id: &str) -> Option<User> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|user| user.id == id)
            .cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, payload: CreateUserPayload) -> Result<User> {
        let mut state = self.state.lock().unwrap();

        if state.users.iter().any(|user| user.email == payload.email) {
            return Err(Error::Conflict(String::from("users_email_key")));
        }

        let user = User {
            id: new_id(),
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            password_hash: payload.password_hash,
            role: payload.role,
            is_active: true,
            last_login_at: None,
            created_at: now(),
            updated_at: None,
            deleted_at: None,
        };

        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.user(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_many(&self, pagination: Pagination) -> Result<Paginated<User>> {
        let users = self.state.lock().unwrap().users.clone();
        Ok(paginate(users, &pagination))
    }

    async fn update_by_id(&self, id: &str, payload: UpdateUserPayload) -> Result<Option<User>> {
        let mut state = self.state.lock().unwrap();
        let Some(user) = state.users.iter_mut().find(|user| user.id == id) else {
            return Ok(None);
        };

        if let Some(name) = payload.name {
            user.name = name;
        }
        if let Some(phone) = payload.phone {
            user.phone = phone;
        }
        if let Some(role) = payload.role {
            user.role = role;
        }
        if let Some(is_active) = payload.is_active {
            user.is_active = is_active;
        }
        if let Some(last_login_at) = payload.last_login_at {
            user.last_login_at = Some(last_login_at);
        }
        user.updated_at = Some(now());

        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl AddressRepository for MemoryStore {
    async fn create(&self, payload: CreateAddressPayload) -> Result<Address> {
        let address = Address {
            id: new_id(),
            user_id: payload.user_id,
            label: payload.label,
            street: payload.street,
            city: payload.city,
            state: payload.state,
            postal_code: payload.postal_code,
            country: payload.country,
            is_default: payload.is_default,
            created_at: now(),
            updated_at: None,
        };

        self.state.lock().unwrap().addresses.push(address.clone());
        Ok(address)
    }

    async fn find_many_by_user_id(&self, user_id: &str) -> Result<Vec<Address>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .addresses
            .iter()
            .filter(|address| address.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id_and_user_id(&self, id: &str, user_id: &str) -> Result<Option<Address>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .addresses
            .iter()
            .find(|address| address.id == id && address.user_id == user_id)
            .cloned())
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateAddressPayload,
    ) -> Result<Option<Address>> {
        let mut state = self.state.lock().unwrap();
        let Some(address) = state.addresses.iter_mut().find(|address| address.id == id) else {
            return Ok(None);
        };

        if let Some(label) = payload.label {
            address.label = label;
        }
        if let Some(street) = payload.street {
            address.street = street;
        }
        if let Some(city) = payload.city {
            address.city = city;
        }
        if let Some(region) = payload.state {
            address.state = region;
        }
        if let Some(postal_code) = payload.postal_code {
            address.postal_code = postal_code;
        }
        if let Some(country) = payload.country {
            address.country = country;
        }
        if let Some(is_default) = payload.is_default {
            address.is_default = is_default;
        }
        address.updated_at = Some(now());

        Ok(Some(address.clone()))
    }

    async fn unset_defaults(&self, user_id: &str, keep_id: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for address in state.addresses.iter_mut() {
            if address.user_id == user_id && Some(address.id.as_str()) != keep_id {
                address.is_default = false;
            }
        }

        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.addresses.len();
        state.addresses.retain(|address| address.id != id);
        Ok(state.addresses.len() != before)
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, payload: CreateCategoryPayload) -> Result<Category> {
        let category = Category {
            id: new_id(),
            name: payload.name,
            description: payload.description,
            is_active: payload.is_active,
            created_at: now(),
            updated_at: None,
        };

        self.state.lock().unwrap().categories.push(category.clone());
        Ok(category)
    }

    async fn find_many(&self) -> Result<Vec<Category>> {
        Ok(self.state.lock().unwrap().categories.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Category>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .categories
            .iter()
            .find(|category| category.id == id)
            .cloned())
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateCategoryPayload,
    ) -> Result<Option<Category>> {
        let mut state = self.state.lock().unwrap();
        let Some(category) = state.categories.iter_mut().find(|category| category.id == id)
        else {
            return Ok(None);
        };

        if let Some(name) = payload.name {
            category.name = name;
        }
        if let Some(description) = payload.description {
            category.description = description;
        }
        if let Some(is_active) = payload.is_active {
            category.is_active = is_active;
        }

        Ok(Some(category.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.categories.len();
        state.categories.retain(|category| category.id != id);
        Ok(state.categories.len() != before)
    }
}

#[async_trait]
impl CuisineRepository for MemoryStore {
    async fn create(&self, payload: CreateCuisinePayload) -> Result<Cuisine> {
        let cuisine = Cuisine {
            id: new_id(),
            name: payload.name,
            description: payload.description,
            image: payload.image,
            is_active: payload.is_active,
            is_popular: payload.is_popular,
            created_at: now(),
            updated_at: None,
        };

        self.state.lock().unwrap().cuisines.push(cuisine.clone());
        Ok(cuisine)
    }

    async fn find_many(&self) -> Result<Vec<Cuisine>> {
        Ok(self.state.lock().unwrap().cuisines.clone())
    }

    async fn find_popular(&self) -> Result<Vec<Cuisine>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .cuisines
            .iter()
            .filter(|cuisine| cuisine.is_popular && cuisine.is_active)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Cuisine>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .cuisines
            .iter()
            .find(|cuisine| cuisine.id == id)
            .cloned())
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateCuisinePayload,
    ) -> Result<Option<Cuisine>> {
        let mut state = self.state.lock().unwrap();
        let Some(cuisine) = state.cuisines.iter_mut().find(|cuisine| cuisine.id == id) else {
            return Ok(None);
        };

        if let Some(name) = payload.name {
            cuisine.name = name;
        }
        if let Some(description) = payload.description {
            cuisine.description = description;
        }
        if let Some(image) = payload.image {
            cuisine.image = Some(image);
        }
        if let Some(is_active) = payload.is_active {
            cuisine.is_active = is_active;
        }
        if let Some(is_popular) = payload.is_popular {
            cuisine.is_popular = is_popular;
        }

        Ok(Some(cuisine.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.cuisines.len();
        state.cuisines.retain(|cuisine| cuisine.id != id);
        Ok(state.cuisines.len() != before)
    }
}

#[async_trait]
impl RestaurantRepository for MemoryStore {
    async fn create(&self, payload: CreateRestaurantPayload) -> Result<Restaurant> {
        let restaurant = Restaurant {
            id: new_id(),
            owner_id: payload.owner_id,
            name: payload.name,
            description: payload.description,
            address: payload.address,
            phone: payload.phone,
            email: payload.email,
            image: payload.image,
            rating: BigDecimal::from(0),
            delivery_fee: payload.delivery_fee,
            is_active: true,
            created_at: now(),
            updated_at: None,
        };

        let mut state = self.state.lock().unwrap();
        for cuisine_id in payload.cuisine_ids {
            state
                .restaurant_cuisines
                .push((restaurant.id.clone(), cuisine_id));
        }
        state.restaurants.push(restaurant.clone());

        Ok(restaurant)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Restaurant>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .restaurants
            .iter()
            .find(|restaurant| restaurant.id == id)
            .cloned())
    }

    async fn find_many(
        &self,
        pagination: Pagination,
        filters: restaurant::FindManyFilters,
    ) -> Result<Paginated<Restaurant>> {
        let state = self.state.lock().unwrap();
        let restaurants = state
            .restaurants
            .iter()
            .filter(|restaurant| filters.include_inactive || restaurant.is_active)
            .filter(|restaurant| match &filters.cuisine_id {
                Some(cuisine_id) => state
                    .restaurant_cuisines
                    .iter()
                    .any(|(r, c)| *r == restaurant.id && c == cuisine_id),
                None => true,
            })
            .filter(|restaurant| match &filters.min_rating {
                Some(min_rating) => restaurant.rating >= *min_rating,
                None => true,
            })
            .filter(|restaurant| match &filters.search {
                Some(search) => restaurant
                    .name
                    .to_lowercase()
                    .contains(&search.trim().to_lowercase()),
                None => true,
            })
            .filter(|restaurant| match &filters.owner_id {
                Some(owner_id) => restaurant.owner_id.as_ref() == Some(owner_id),
                None => true,
            })
            .cloned()
            .collect();

        Ok(paginate(restaurants, &pagination))
    }

    async fn find_many_by_owner_id(&self, owner_id: &str) -> Result<Vec<Restaurant>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .restaurants
            .iter()
            .filter(|restaurant| restaurant.owner_id.as_deref() == Some(owner_id))
            .cloned()
            .collect())
    }

    async fn find_cuisines(&self, restaurant_id: &str) -> Result<Vec<Cuisine>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .cuisines
            .iter()
            .filter(|cuisine| {
                state
                    .restaurant_cuisines
                    .iter()
                    .any(|(r, c)| r == restaurant_id && *c == cuisine.id)
            })
            .cloned()
            .collect())
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateRestaurantPayload,
    ) -> Result<Option<Restaurant>> {
        let mut state = self.state.lock().unwrap();
        let Some(restaurant) = state.restaurants.iter_mut().find(|restaurant| restaurant.id == id)
        else {
            return Ok(None);
        };

        if let Some(name) = payload.name {
            restaurant.name = name;
        }
        if let Some(description) = payload.description {
            restaurant.description = description;
        }
        if let Some(address) = payload.address {
            restaurant.address = address;
        }
        if let Some(phone) = payload.phone {
            restaurant.phone = phone;
        }
        if let Some(email) = payload.email {
            restaurant.email = email;
        }
        if let Some(image) = payload.image {
            restaurant.image = Some(image);
        }
        if let Some(delivery_fee) = payload.delivery_fee {
            restaurant.delivery_fee = delivery_fee;
        }
        if let Some(is_active) = payload.is_active {
            restaurant.is_active = is_active;
        }
        restaurant.updated_at = Some(now());
        let updated = restaurant.clone();

        if let Some(cuisine_ids) = payload.cuisine_ids {
            state.restaurant_cuisines.retain(|(r, _)| r != id);
            for cuisine_id in cuisine_ids {
                state.restaurant_cuisines.push((id.to_string(), cuisine_id));
            }
        }

        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.restaurants.len();
        state.restaurants.retain(|restaurant| restaurant.id != id);
        Ok(state.restaurants.len() != before)
    }

    async fn find_working_hours(&self, restaurant_id: &str) -> Result<Vec<WorkingHour>> {
        let mut hours: Vec<WorkingHour> = self
            .state
            .lock()
            .unwrap()
            .working_hours
            .iter()
            .filter(|hour| hour.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        hours.sort_by_key(|hour| hour.day_of_week);

        Ok(hours)
    }

    async fn replace_working_hours(
        &self,
        restaurant_id: &str,
        hours: Vec<WorkingHourPayload>,
    ) -> Result<Vec<WorkingHour>> {
        {
            let mut state = self.state.lock().unwrap();
            state
                .working_hours
                .retain(|hour| hour.restaurant_id != restaurant_id);

            for hour in hours {
                state.working_hours.push(WorkingHour {
                    id: new_id(),
                    restaurant_id: restaurant_id.to_string(),
                    day_of_week: hour.day_of_week,
                    open_time: hour.open_time,
                    close_time: hour.close_time,
                    is_closed: hour.is_closed,
                    created_at: now(),
                    updated_at: None,
                });
            }
        }

        self.find_working_hours(restaurant_id).await
    }

    async fn assign_owner(
        &self,
        restaurant_id: &str,
        user_id: &str,
    ) -> Result<Option<Restaurant>> {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state
            .restaurants
            .iter()
            .position(|restaurant| restaurant.id == restaurant_id)
        else {
            return Ok(None);
        };

        if let Some(user) = state.users.iter_mut().find(|user| user.id == user_id) {
            if user.role == Role::Customer {
                user.role = Role::Owner;
            }
        }

        let restaurant = &mut state.restaurants[index];
        restaurant.owner_id = Some(user_id.to_string());
        Ok(Some(restaurant.clone()))
    }
}

#[async_trait]
impl MenuItemRepository for MemoryStore {
    async fn create(&self, payload: CreateMenuItemPayload) -> Result<MenuItem> {
        let menu_item = MenuItem {
            id: new_id(),
            restaurant_id: payload.restaurant_id,
            category_id: payload.category_id,
            name: payload.name,
            description: payload.description,
            price: payload.price,
            image: payload.image,
            is_available: payload.is_available,
            created_at: now(),
            updated_at: None,
        };

        self.state.lock().unwrap().menu_items.push(menu_item.clone());
        Ok(menu_item)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MenuItem>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .menu_items
            .iter()
            .find(|item| item.id == id)
            .cloned())
    }

    async fn find_many(
        &self,
        pagination: Pagination,
        filters: menu::FindManyFilters,
    ) -> Result<Paginated<MenuItem>> {
        let items = self
            .state
            .lock()
            .unwrap()
            .menu_items
            .iter()
            .filter(|item| match &filters.restaurant_id {
                Some(restaurant_id) => item.restaurant_id == *restaurant_id,
                None => true,
            })
            .filter(|item| match &filters.category_id {
                Some(category_id) => item.category_id.as_ref() == Some(category_id),
                None => true,
            })
            .filter(|item| match filters.is_available {
                Some(is_available) => item.is_available == is_available,
                None => true,
            })
            .cloned()
            .collect();

        Ok(paginate(items, &pagination))
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: UpdateMenuItemPayload,
    ) -> Result<Option<MenuItem>> {
        let mut state = self.state.lock().unwrap();
        let Some(item) = state.menu_items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };

        if let Some(category_id) = payload.category_id {
            item.category_id = Some(category_id);
        }
        if let Some(name) = payload.name {
            item.name = name;
        }
        if let Some(description) = payload.description {
            item.description = description;
        }
        if let Some(price) = payload.price {
            item.price = price;
        }
        if let Some(image) = payload.image {
            item.image = Some(image);
        }
        if let Some(is_available) = payload.is_available {
            item.is_available = is_available;
        }
        item.updated_at = Some(now());

        Ok(Some(item.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.menu_items.len();
        state.menu_items.retain(|item| item.id != id);
        Ok(state.menu_items.len() != before)
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn find_or_create_by_user_id(&self, user_id: &str) -> Result<Cart> {
        let mut state = self.state.lock().unwrap();
        if let Some(cart) = state.carts.iter().find(|cart| cart.user_id == user_id) {
            return Ok(cart.clone());
        }

        let cart = Cart {
            id: new_id(),
            user_id: user_id.to_string(),
            created_at: now(),
            updated_at: None,
        };
        state.carts.push(cart.clone());

        Ok(cart)
    }

    async fn add_item(
        &self,
        cart_id: &str,
        menu_item_id: &str,
        quantity: i32,
        max_quantity: i32,
    ) -> Result<Option<CartItem>> {
        let mut state = self.state.lock().unwrap();
        if let Some(item) = state
            .cart_items
            .iter_mut()
            .find(|item| item.cart_id == cart_id && item.menu_item_id == menu_item_id)
        {
            return Ok(match item.quantity.checked_add(quantity) {
                Some(total) if total <= max_quantity => {
                    item.quantity = total;
                    item.updated_at = Some(now());
                    Some(item.clone())
                }
                _ => None,
            });
        }

        let item = CartItem {
            id: new_id(),
            cart_id: cart_id.to_string(),
            menu_item_id: menu_item_id.to_string(),
            quantity,
            created_at: now(),
            updated_at: None,
        };
        state.cart_items.push(item.clone());

        Ok(Some(item))
    }

    async fn update_item_quantity(
        &self,
        cart_id: &str,
        item_id: &str,
        quantity: i32,
    ) -> Result<Option<CartItem>> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .cart_items
            .iter_mut()
            .find(|item| item.cart_id == cart_id && item.id == item_id)
            .map(|item| {
                item.quantity = quantity;
                item.updated_at = Some(now());
                item.clone()
            }))
    }

    async fn remove_item(&self, cart_id: &str, item_id: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.cart_items.len();
        state
            .cart_items
            .retain(|item| !(item.cart_id == cart_id && item.id == item_id));
        Ok(state.cart_items.len() != before)
    }

    async fn find_lines(&self, cart_id: &str) -> Result<Vec<CartLine>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .cart_items
            .iter()
            .filter(|item| item.cart_id == cart_id)
            .map(|item| CartLine {
                item: item.clone(),
                menu_item: state
                    .menu_items
                    .iter()
                    .find(|menu_item| menu_item.id == item.menu_item_id)
                    .cloned(),
            })
            .collect())
    }

    async fn clear(&self, cart_id: &str) -> Result<u64> {
        if self.fail_cart_clear.load(Ordering::SeqCst) {
            return Err(Error::UnexpectedError(String::from("cart storage offline")));
        }

        let mut state = self.state.lock().unwrap();
        let before = state.cart_items.len();
        state.cart_items.retain(|item| item.cart_id != cart_id);
        Ok((before - state.cart_items.len()) as u64)
    }

    async fn remove_ordered(&self, cart_id: &str, ordered: &[CartItem]) -> Result<u64> {
        if self.fail_cart_clear.load(Ordering::SeqCst) {
            return Err(Error::UnexpectedError(String::from("cart storage offline")));
        }

        let mut state = self.state.lock().unwrap();
        let before = state.cart_items.len();

        for ordered in ordered {
            if let Some(item) = state
                .cart_items
                .iter_mut()
                .find(|item| item.cart_id == cart_id && item.id == ordered.id)
            {
                item.quantity -= ordered.quantity.min(item.quantity);
            }
        }
        state.cart_items.retain(|item| item.quantity > 0);

        Ok((before - state.cart_items.len()) as u64)
    }
}

impl MemoryStore {
    fn full_order(state: &State, order: &Order) -> FullOrder {
        FullOrder {
            order: order.clone(),
            items: state
                .order_items
                .iter()
                .filter(|item| item.order_id == order.id)
                .cloned()
                .collect(),
        }
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create(&self, payload: CreateOrderPayload) -> Result<FullOrder> {
        let mut state = self.state.lock().unwrap();
        let order = Order {
            id: new_id(),
            user_id: payload.user_id,
            restaurant_id: payload.restaurant_id,
            total_amount: payload.total_amount,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: payload.payment_method,
            delivery_address: payload.delivery_address,
            created_at: now(),
            updated_at: None,
        };

        for item in payload.items {
            state.order_items.push(OrderItem {
                id: new_id(),
                order_id: order.id.clone(),
                menu_item_id: item.menu_item_id,
                name: item.name,
                price: item.price,
                quantity: item.quantity,
                created_at: now(),
            });
        }

        state.history.push(OrderStatusHistory {
            id: new_id(),
            order_id: order.id.clone(),
            status: OrderStatus::Pending,
            changed_by: Some(order.user_id.clone()),
            created_at: now(),
        });
        state.orders.push(order.clone());

        Ok(Self::full_order(&state, &order))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<FullOrder>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .find(|order| order.id == id)
            .map(|order| Self::full_order(&state, order)))
    }

    async fn find_many(
        &self,
        pagination: Pagination,
        filters: order::FindManyFilters,
    ) -> Result<Paginated<Order>> {
        let state = self.state.lock().unwrap();
        let orders = state
            .orders
            .iter()
            .rev()
            .filter(|order| match &filters.user_id {
                Some(user_id) => order.user_id == *user_id,
                None => true,
            })
            .filter(|order| match &filters.owner_id {
                Some(owner_id) => state.restaurants.iter().any(|restaurant| {
                    restaurant.id == order.restaurant_id
                        && restaurant.owner_id.as_ref() == Some(owner_id)
                }),
                None => true,
            })
            .filter(|order| match &filters.restaurant_id {
                Some(restaurant_id) => order.restaurant_id == *restaurant_id,
                None => true,
            })
            .filter(|order| match filters.status {
                Some(status) => order.status == status,
                None => true,
            })
            .cloned()
            .collect();

        Ok(paginate(orders, &pagination))
    }

    async fn find_history(&self, order_id: &str) -> Result<Vec<OrderStatusHistory>> {
        Ok(self.history_of(order_id))
    }

    async fn update_status(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
        payment_status: Option<PaymentStatus>,
        changed_by: &str,
    ) -> Result<Option<Order>> {
        let mut state = self.state.lock().unwrap();
        let Some(order) = state
            .orders
            .iter_mut()
            .find(|order| order.id == id && order.status == from)
        else {
            return Ok(None);
        };

        order.status = to;
        if let Some(payment_status) = payment_status {
            order.payment_status = payment_status;
        }
        order.updated_at = Some(now());
        let order = order.clone();

        state.history.push(OrderStatusHistory {
            id: new_id(),
            order_id: id.to_string(),
            status: to,
            changed_by: Some(changed_by.to_string()),
            created_at: now(),
        });

        Ok(Some(order))
    }

    async fn update_payment_status(
        &self,
        id: &str,
        payment_status: PaymentStatus,
    ) -> Result<Option<Order>> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter_mut()
            .find(|order| order.id == id)
            .map(|order| {
                order.payment_status = payment_status;
                order.updated_at = Some(now());
                order.clone()
            }))
    }
}

#[async_trait]
impl StatsRepository for MemoryStore {
    async fn overview(&self) -> Result<Overview> {
        let state = self.state.lock().unwrap();
        let total_revenue = state
            .orders
            .iter()
            .filter(|order| order.status != OrderStatus::Cancelled)
            .fold(BigDecimal::from(0), |total, order| {
                total + order.total_amount.clone()
            });

        Ok(Overview {
            total_users: state.users.len() as i64,
            total_orders: state.orders.len() as i64,
            total_revenue,
            active_restaurants: state
                .restaurants
                .iter()
                .filter(|restaurant| restaurant.is_active)
                .count() as i64,
        })
    }

    async fn analytics(&self) -> Result<Analytics> {
        Ok(Analytics {
            daily_orders: vec![],
            popular_items: vec![],
            monthly_revenue: vec![],
        })
    }

    async fn customers(&self, pagination: Pagination) -> Result<Paginated<CustomerSummary>> {
        let state = self.state.lock().unwrap();
        let customers = state
            .users
            .iter()
            .filter(|user| user.role == Role::Customer)
            .map(|user| {
                let orders: Vec<&Order> = state
                    .orders
                    .iter()
                    .filter(|order| order.user_id == user.id)
                    .collect();

                CustomerSummary {
                    id: user.id.clone(),
                    name: user.name.clone(),
                    email: user.email.clone(),
                    phone: user.phone.clone(),
                    total_orders: orders.len() as i64,
                    total_spent: orders.iter().fold(BigDecimal::from(0), |total, order| {
                        total + order.total_amount.clone()
                    }),
                    last_order_at: orders.iter().map(|order| order.created_at).max(),
                    created_at: user.created_at,
                }
            })
            .collect();

        Ok(paginate(customers, &pagination))
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub ctx: Arc<Context>,
    pub tokens: TokenIssuer,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_repositories(|_, _| {})
    }

    /// Builds the app on the in-memory store after letting the caller swap
    /// individual repositories.
    pub fn with_repositories(customize: impl FnOnce(&Arc<MemoryStore>, &mut Repositories)) -> Self {
        let store = MemoryStore::new();
        let tokens = TokenIssuer::new(JWT_SECRET, Duration::hours(1), Duration::hours(24));

        let mut repositories = Repositories {
            users: store.clone(),
            addresses: store.clone(),
            categories: store.clone(),
            cuisines: store.clone(),
            restaurants: store.clone(),
            menu_items: store.clone(),
            carts: store.clone(),
            orders: store.clone(),
            stats: store.clone(),
        };
        customize(&store, &mut repositories);

        let ctx = Arc::new(Context::new(
            AppContext {
                host: String::from("127.0.0.1"),
                environment: AppEnvironment::Development,
                port: 0,
                url: String::from("http://127.0.0.1"),
            },
            StorageContext {
                uploads_dir: std::env::temp_dir()
                    .join("foodie-test-uploads")
                    .to_string_lossy()
                    .to_string(),
            },
            tokens.clone(),
            repositories,
        ));

        Self { store, ctx, tokens }
    }

    pub fn router(&self) -> Router {
        app::router(self.ctx.clone())
    }

    pub fn bearer(&self, user: &User) -> String {
        let token = self.tokens.issue(user, TokenType::Access).unwrap();
        format!("Bearer {}", token)
    }

    /// Sends one request through the full router and returns the status and
    /// decoded JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&User>,
        body: Option<Value>,
    ) -> (u16, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(user) = auth {
            builder = builder.header(header::AUTHORIZATION, self.bearer(user));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = match bytes.is_empty() {
            true => Value::Null,
            false => serde_json::from_slice(&bytes).unwrap(),
        };

        (status, body)
    }
}
