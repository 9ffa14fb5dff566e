pub mod app;
pub mod error;
pub mod modules;
pub mod types;
pub mod utils;
