pub use crate::utils::database;
use async_trait::async_trait;
use chrono::Duration;
use std::{env, sync::Arc};

use crate::modules::{
    address::{
        repository::{AddressRepository, PgAddressRepository},
        service::AddressService,
    },
    admin::repository::{PgStatsRepository, StatsRepository},
    auth::{service::AuthService, token::TokenIssuer},
    cart::{
        repository::{CartRepository, PgCartRepository},
        service::CartService,
    },
    category::repository::{CategoryRepository, PgCategoryRepository},
    cuisine::repository::{CuisineRepository, PgCuisineRepository},
    menu::{
        repository::{MenuItemRepository, PgMenuItemRepository},
        service::MenuService,
    },
    order::{
        repository::{OrderRepository, PgOrderRepository},
        service::OrderService,
    },
    restaurant::{
        repository::{PgRestaurantRepository, RestaurantRepository},
        service::RestaurantService,
    },
    user::repository::{PgUserRepository, UserRepository},
};

#[derive(Clone, Debug, PartialEq)]
pub enum AppEnvironment {
    Production,
    Development,
}

impl AppEnvironment {
    pub fn from(raw_environment: String) -> Self {
        match raw_environment.as_ref() {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
}

#[derive(Clone)]
pub struct StorageContext {
    pub uploads_dir: String,
}

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub cuisines: Arc<dyn CuisineRepository>,
    pub restaurants: Arc<dyn RestaurantRepository>,
    pub menu_items: Arc<dyn MenuItemRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub stats: Arc<dyn StatsRepository>,
}

impl Repositories {
    pub fn postgres(db_conn: &database::DatabaseConnection) -> Self {
        let pool = db_conn.pool.clone();

        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            addresses: Arc::new(PgAddressRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            cuisines: Arc::new(PgCuisineRepository::new(pool.clone())),
            restaurants: Arc::new(PgRestaurantRepository::new(pool.clone())),
            menu_items: Arc::new(PgMenuItemRepository::new(pool.clone())),
            carts: Arc::new(PgCartRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            stats: Arc::new(PgStatsRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub storage: StorageContext,
    pub repositories: Repositories,
    pub auth: AuthService,
    pub carts: CartService,
    pub orders: OrderService,
    pub restaurants: RestaurantService,
    pub menu: MenuService,
    pub addresses: AddressService,
}

impl Context {
    /// Wires every service to the given repositories.
    pub fn new(
        app: AppContext,
        storage: StorageContext,
        tokens: TokenIssuer,
        repositories: Repositories,
    ) -> Self {
        let repos = &repositories;

        Self {
            auth: AuthService::new(repos.users.clone(), tokens),
            carts: CartService::new(repos.carts.clone(), repos.menu_items.clone()),
            orders: OrderService::new(
                repos.carts.clone(),
                repos.orders.clone(),
                repos.restaurants.clone(),
            ),
            restaurants: RestaurantService::new(
                repos.restaurants.clone(),
                repos.cuisines.clone(),
                repos.menu_items.clone(),
                repos.users.clone(),
            ),
            menu: MenuService::new(
                repos.menu_items.clone(),
                repos.restaurants.clone(),
                repos.categories.clone(),
            ),
            addresses: AddressService::new(repos.addresses.clone()),
            app,
            storage,
            repositories,
        }
    }
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_hours: i64,
    pub refresh_token_ttl_hours: i64,
}

#[derive(Clone)]
pub struct StorageConfig {
    pub uploads_dir: String,
}

#[derive(Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .unwrap_or_else(|_| panic!("Invalid value for {}: {}", name, raw)),
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 4u32);
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let port = parse_env("PORT", 8000u32);
        let url = env::var("URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET not set");
        let access_token_ttl_hours = parse_env("ACCESS_TOKEN_TTL_HOURS", 24 * 7i64);
        let refresh_token_ttl_hours = parse_env("REFRESH_TOKEN_TTL_HOURS", 24 * 30i64);
        let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string());

        Self {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            app: AppConfig {
                host,
                environment: AppEnvironment::from(environment),
                port,
                url,
            },
            auth: AuthConfig {
                jwt_secret,
                access_token_ttl_hours,
                refresh_token_ttl_hours,
            },
            storage: StorageConfig { uploads_dir },
        }
    }
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Context;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Context {
        let db_conn =
            database::connect(self.database.url.as_str(), self.database.max_connections).await;
        database::migrate(db_conn.clone()).await;

        let tokens = TokenIssuer::new(
            &self.auth.jwt_secret,
            Duration::hours(self.auth.access_token_ttl_hours),
            Duration::hours(self.auth.refresh_token_ttl_hours),
        );

        Context::new(
            AppContext {
                host: self.app.host,
                environment: self.app.environment,
                port: self.app.port,
                url: self.app.url,
            },
            StorageContext {
                uploads_dir: self.storage.uploads_dir,
            },
            tokens,
            Repositories::postgres(&db_conn),
        )
    }
}
