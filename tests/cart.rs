mod common;

use bigdecimal::BigDecimal;
use common::TestApp;
use foodie_backend_rs::{error::Error, modules::user::repository::Role};
use std::str::FromStr;

#[tokio::test]
async fn adding_the_same_item_twice_merges_the_line() {
    let app = TestApp::new();
    let user = app.store.seed_user("eve@example.com", Role::Customer);
    let restaurant = app.store.seed_restaurant("Pasta Place", None);
    let pasta = app.store.seed_menu_item(&restaurant.id, "Pasta", "9.50");

    let first = app.ctx.carts.add_item(&user.id, &pasta.id, 2).await.unwrap();
    let second = app.ctx.carts.add_item(&user.id, &pasta.id, 3).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 5);
    assert_eq!(app.store.cart_item_count(&user.id), 1);
}

#[tokio::test]
async fn cart_is_created_once_per_user() {
    let app = TestApp::new();
    let user = app.store.seed_user("eve@example.com", Role::Customer);

    let (a, b) = tokio::join!(
        app.ctx.carts.get_or_create_cart(&user.id),
        app.ctx.carts.get_or_create_cart(&user.id)
    );

    assert_eq!(a.unwrap().id, b.unwrap().id);
}

#[tokio::test]
async fn rejects_quantities_below_one() {
    let app = TestApp::new();
    let user = app.store.seed_user("eve@example.com", Role::Customer);
    let restaurant = app.store.seed_restaurant("Pasta Place", None);
    let pasta = app.store.seed_menu_item(&restaurant.id, "Pasta", "9.50");

    let err = app.ctx.carts.add_item(&user.id, &pasta.id, 0).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let line = app.ctx.carts.add_item(&user.id, &pasta.id, 1).await.unwrap();
    let err = app
        .ctx
        .carts
        .update_item_quantity(&user.id, &line.id, -1)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(app.store.cart_item_count(&user.id), 1);
}

#[tokio::test]
async fn unknown_menu_item_is_not_found() {
    let app = TestApp::new();
    let user = app.store.seed_user("eve@example.com", Role::Customer);

    let err = app
        .ctx
        .carts
        .add_item(&user.id, "01HZZZZZZZZZZZZZZZZZZZZZZZ", 1)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn unavailable_items_cannot_be_added() {
    let app = TestApp::new();
    let user = app.store.seed_user("eve@example.com", Role::Customer);
    let restaurant = app.store.seed_restaurant("Pasta Place", None);
    let pasta = app.store.seed_menu_item(&restaurant.id, "Pasta", "9.50");
    app.store.set_menu_item_available(&pasta.id, false);

    let err = app.ctx.carts.add_item(&user.id, &pasta.id, 1).await.unwrap_err();

    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn updating_a_missing_line_is_not_found() {
    let app = TestApp::new();
    let user = app.store.seed_user("eve@example.com", Role::Customer);

    let err = app
        .ctx
        .carts
        .update_item_quantity(&user.id, "missing", 2)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn removing_a_line_twice_reports_not_found() {
    let app = TestApp::new();
    let user = app.store.seed_user("eve@example.com", Role::Customer);
    let restaurant = app.store.seed_restaurant("Pasta Place", None);
    let pasta = app.store.seed_menu_item(&restaurant.id, "Pasta", "9.50");
    let line = app.ctx.carts.add_item(&user.id, &pasta.id, 1).await.unwrap();

    app.ctx.carts.remove_item(&user.id, &line.id).await.unwrap();
    let err = app.ctx.carts.remove_item(&user.id, &line.id).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn users_cannot_touch_other_carts() {
    let app = TestApp::new();
    let eve = app.store.seed_user("eve@example.com", Role::Customer);
    let mallory = app.store.seed_user("mallory@example.com", Role::Customer);
    let restaurant = app.store.seed_restaurant("Pasta Place", None);
    let pasta = app.store.seed_menu_item(&restaurant.id, "Pasta", "9.50");
    let line = app.ctx.carts.add_item(&eve.id, &pasta.id, 1).await.unwrap();

    let err = app
        .ctx
        .carts
        .remove_item(&mallory.id, &line.id)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(app.store.cart_item_count(&eve.id), 1);
}

#[tokio::test]
async fn clearing_keeps_the_cart() {
    let app = TestApp::new();
    let user = app.store.seed_user("eve@example.com", Role::Customer);
    let restaurant = app.store.seed_restaurant("Pasta Place", None);
    let pasta = app.store.seed_menu_item(&restaurant.id, "Pasta", "9.50");
    let salad = app.store.seed_menu_item(&restaurant.id, "Salad", "4.00");
    app.ctx.carts.add_item(&user.id, &pasta.id, 1).await.unwrap();
    app.ctx.carts.add_item(&user.id, &salad.id, 2).await.unwrap();
    let cart = app.ctx.carts.get_or_create_cart(&user.id).await.unwrap();

    let removed = app.ctx.carts.clear(&cart.id).await.unwrap();

    assert_eq!(removed, 2);
    let full = app.ctx.carts.get_full_cart(&user.id).await.unwrap();
    assert_eq!(full.cart.id, cart.id);
    assert!(full.items.is_empty());
}

#[tokio::test]
async fn full_cart_totals_current_prices() {
    let app = TestApp::new();
    let user = app.store.seed_user("eve@example.com", Role::Customer);
    let restaurant = app.store.seed_restaurant("Pasta Place", None);
    let pasta = app.store.seed_menu_item(&restaurant.id, "Pasta", "9.50");
    app.ctx.carts.add_item(&user.id, &pasta.id, 2).await.unwrap();

    let full = app.ctx.carts.get_full_cart(&user.id).await.unwrap();
    assert_eq!(full.total, BigDecimal::from_str("19.00").unwrap());

    app.store.set_menu_item_price(&pasta.id, "10.00");
    let full = app.ctx.carts.get_full_cart(&user.id).await.unwrap();
    assert_eq!(full.total, BigDecimal::from(20));
}

#[tokio::test]
async fn line_quantities_are_capped() {
    let app = TestApp::new();
    let user = app.store.seed_user("eve@example.com", Role::Customer);
    let restaurant = app.store.seed_restaurant("Pasta Place", None);
    let pasta = app.store.seed_menu_item(&restaurant.id, "Pasta", "9.50");

    let err = app
        .ctx
        .carts
        .add_item(&user.id, &pasta.id, i32::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(app.store.cart_item_count(&user.id), 0);

    let line = app.ctx.carts.add_item(&user.id, &pasta.id, 998).await.unwrap();
    let err = app.ctx.carts.add_item(&user.id, &pasta.id, 2).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(
        app.store.cart_quantities(&user.id),
        vec![(pasta.id.clone(), 998)]
    );

    let merged = app.ctx.carts.add_item(&user.id, &pasta.id, 1).await.unwrap();
    assert_eq!(merged.quantity, 999);

    let err = app
        .ctx
        .carts
        .update_item_quantity(&user.id, &line.id, 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(app.store.cart_quantities(&user.id), vec![(pasta.id, 999)]);
}
