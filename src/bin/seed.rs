//! Inserts demo cuisines, categories, an admin account and a handful of
//! restaurants with menus. Running it twice leaves the data unchanged.

use bigdecimal::BigDecimal;
use foodie_backend_rs::{
    error::{Error, Result},
    modules::{
        auth::{password, service::auth::normalize_email},
        category::repository::CreateCategoryPayload,
        cuisine::repository::CreateCuisinePayload,
        menu::repository::CreateMenuItemPayload,
        restaurant::repository::{CreateRestaurantPayload, FindManyFilters},
        user::repository::{CreateUserPayload, Role},
    },
    types::Repositories,
    utils::{database, pagination::Pagination},
};
use std::{env, str::FromStr};
use tracing_subscriber::prelude::*;

const CUISINES: [(&str, &str, bool); 8] = [
    ("Italian", "Pasta, pizza and Mediterranean flavors", true),
    ("Chinese", "Stir-fries, dumplings and rice dishes", true),
    ("Japanese", "Sushi, ramen and traditional washoku", true),
    ("Indian", "Curries, tandoor dishes and spices", true),
    ("Mexican", "Tacos, enchiladas and Latin flavors", false),
    ("Thai", "Sweet, sour, spicy and savory", false),
    ("French", "Fine dining and classic techniques", false),
    ("Korean", "Kimchi, barbecue and fermented dishes", false),
];

const CATEGORIES: [(&str, &str); 6] = [
    ("Appetizers", "Starters and small plates"),
    ("Main Course", "Primary dishes and entrees"),
    ("Desserts", "Sweet treats"),
    ("Beverages", "Drinks and refreshments"),
    ("Salads", "Fresh and healthy options"),
    ("Soups", "Hot and cold soups"),
];

struct DemoRestaurant {
    name: &'static str,
    description: &'static str,
    address: &'static str,
    phone: &'static str,
    email: &'static str,
    rating: &'static str,
    cuisine: &'static str,
    menu: &'static [(&'static str, &'static str, &'static str)],
}

const RESTAURANTS: [DemoRestaurant; 3] = [
    DemoRestaurant {
        name: "La Piazza",
        description: "Authentic Italian cuisine in a cozy atmosphere",
        address: "123 Main St, Downtown",
        phone: "+1234567890",
        email: "info@lapiazza.com",
        rating: "4.5",
        cuisine: "Italian",
        menu: &[
            ("Margherita Pizza", "Main Course", "12.50"),
            ("Bruschetta", "Appetizers", "6.00"),
            ("Tiramisu", "Desserts", "7.25"),
        ],
    },
    DemoRestaurant {
        name: "Dragon Palace",
        description: "Traditional Chinese dishes with modern flair",
        address: "456 Oak Ave, Chinatown",
        phone: "+1234567891",
        email: "info@dragonpalace.com",
        rating: "4.3",
        cuisine: "Chinese",
        menu: &[
            ("Kung Pao Chicken", "Main Course", "11.00"),
            ("Hot and Sour Soup", "Soups", "5.50"),
            ("Spring Rolls", "Appetizers", "4.75"),
        ],
    },
    DemoRestaurant {
        name: "Sushi Zen",
        description: "Authentic Japanese sushi and ramen",
        address: "789 Cherry Ln, Japantown",
        phone: "+1234567892",
        email: "info@sushizen.com",
        rating: "4.7",
        cuisine: "Japanese",
        menu: &[
            ("Salmon Nigiri", "Main Course", "9.00"),
            ("Miso Soup", "Soups", "3.50"),
            ("Green Tea", "Beverages", "2.00"),
        ],
    },
];

fn decimal(raw: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(raw).map_err(|err| Error::Internal(err.to_string()))
}

async fn seed_cuisines(repositories: &Repositories) -> Result<()> {
    let existing = repositories.cuisines.find_many().await?;

    for (name, description, is_popular) in CUISINES {
        if existing.iter().any(|cuisine| cuisine.name == name) {
            continue;
        }

        repositories
            .cuisines
            .create(CreateCuisinePayload {
                name: name.to_string(),
                description: description.to_string(),
                image: None,
                is_active: true,
                is_popular,
            })
            .await?;
        tracing::info!("Seeded cuisine {}", name);
    }

    Ok(())
}

async fn seed_categories(repositories: &Repositories) -> Result<()> {
    let existing = repositories.categories.find_many().await?;

    for (name, description) in CATEGORIES {
        if existing.iter().any(|category| category.name == name) {
            continue;
        }

        repositories
            .categories
            .create(CreateCategoryPayload {
                name: name.to_string(),
                description: description.to_string(),
                is_active: true,
            })
            .await?;
        tracing::info!("Seeded category {}", name);
    }

    Ok(())
}

async fn seed_admin(repositories: &Repositories) -> Result<()> {
    let email = normalize_email(
        &env::var("ADMIN_EMAIL").unwrap_or_else(|_| String::from("admin@foodie.local")),
    );
    let admin_password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| String::from("admin123"));

    if repositories.users.find_by_email(&email).await?.is_some() {
        return Ok(());
    }

    let password_hash = password::hash(&admin_password)?;
    repositories
        .users
        .create(CreateUserPayload {
            name: String::from("Administrator"),
            email: email.clone(),
            phone: String::from("+10000000000"),
            password_hash,
            role: Role::Admin,
        })
        .await?;
    tracing::info!("Seeded admin account {}", email);

    Ok(())
}

async fn seed_restaurants(
    db_conn: &database::DatabaseConnection,
    repositories: &Repositories,
) -> Result<()> {
    let cuisines = repositories.cuisines.find_many().await?;
    let categories = repositories.categories.find_many().await?;

    for demo in RESTAURANTS.iter() {
        let existing = repositories
            .restaurants
            .find_many(
                Pagination::default(),
                FindManyFilters {
                    search: Some(demo.name.to_string()),
                    include_inactive: true,
                    ..Default::default()
                },
            )
            .await?;
        if existing.items.iter().any(|restaurant| restaurant.name == demo.name) {
            continue;
        }

        let cuisine_ids = cuisines
            .iter()
            .filter(|cuisine| cuisine.name == demo.cuisine)
            .map(|cuisine| cuisine.id.clone())
            .collect();

        let restaurant = repositories
            .restaurants
            .create(CreateRestaurantPayload {
                owner_id: None,
                name: demo.name.to_string(),
                description: demo.description.to_string(),
                address: demo.address.to_string(),
                phone: demo.phone.to_string(),
                email: demo.email.to_string(),
                image: None,
                delivery_fee: decimal("2.99")?,
                cuisine_ids,
            })
            .await?;

        sqlx::query("UPDATE restaurants SET rating = $1 WHERE id = $2")
            .bind(decimal(demo.rating)?)
            .bind(&restaurant.id)
            .execute(&db_conn.pool)
            .await
            .map_err(database::log_error("setting demo restaurant rating"))?;

        for (name, category, price) in demo.menu {
            repositories
                .menu_items
                .create(CreateMenuItemPayload {
                    restaurant_id: restaurant.id.clone(),
                    category_id: categories
                        .iter()
                        .find(|candidate| candidate.name == *category)
                        .map(|candidate| candidate.id.clone()),
                    name: name.to_string(),
                    description: String::new(),
                    price: decimal(price)?,
                    image: None,
                    is_available: true,
                })
                .await?;
        }

        tracing::info!("Seeded restaurant {} with {} items", demo.name, demo.menu.len());
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let db_conn = database::connect(&database_url, 2).await;
    database::migrate(db_conn.clone()).await;

    let repositories = Repositories::postgres(&db_conn);

    let result = async {
        seed_cuisines(&repositories).await?;
        seed_categories(&repositories).await?;
        seed_admin(&repositories).await?;
        seed_restaurants(&db_conn, &repositories).await
    }
    .await;

    match result {
        Ok(()) => tracing::info!("Seeding finished"),
        Err(err) => {
            tracing::error!("Seeding failed: {}", err);
            std::process::exit(1);
        }
    }
}
