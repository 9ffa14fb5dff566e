pub mod address;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod category;
pub mod cuisine;
pub mod menu;
pub mod order;
pub mod owner;
pub mod restaurant;
pub mod user;

mod router;
pub use router::get_router;
