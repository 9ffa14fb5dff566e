pub mod auth;

pub use auth::{AuthService, LoginResult, RegisterPayload};
